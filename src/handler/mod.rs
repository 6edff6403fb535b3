//! Request handler module
//!
//! Request context, the application handler registry, routing dispatch and
//! static file serving.

pub mod context;
pub mod router;
pub mod static_files;

// Re-export the types applications touch
pub use context::{HandlerSet, Outcome, RequestContext, RequestError};
pub use router::handle_request;
pub use static_files::StaticOutcome;
