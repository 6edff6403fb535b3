//! minihttpd: an embeddable HTTP server with convention-based routing and
//! cached static file serving.
//!
//! An application resolves a [`Config`] (built-in defaults shallow-merged
//! with an optional JSON file), registers named handler closures in a
//! [`HandlerSet`], and hands both to [`Server`]:
//!
//! ```no_run
//! use minihttpd::{Config, HandlerSet, Outcome, Server};
//!
//! let config = Config::resolve(Some(std::path::Path::new("config.json")))?;
//! let mut handlers = HandlerSet::new();
//! handlers.register("default_response", |ctx| {
//!     ctx.content = "<h1>Hello world!</h1>".to_string();
//!     Outcome::Continue
//! });
//! Server::new(config, handlers).serve_forever()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Requests under the configured static URL prefix are served from the
//! static folder with `If-Modified-Since`/304 cache negotiation. Every
//! other request resolves a handler by route table entry or the
//! `routed_<path>` naming convention; unresolved paths answer 404.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod template;

pub use config::{Config, ConfigError, RouteTable};
pub use handler::{HandlerSet, Outcome, RequestContext, RequestError};
pub use server::Server;
pub use template::TemplateError;
