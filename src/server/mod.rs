// Server module entry point
// Owns the read-only runtime state and drives the listener and accept loop.

pub mod connection;
pub mod listener;

// `loop` is a keyword, so the file keeps the short name and the module
// takes a longer one.
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;

use crate::config::Config;
use crate::handler::HandlerSet;
use crate::logger;

pub use listener::bind_listener;

/// Process-wide read-only state shared by every connection: the resolved
/// configuration and the application's handler registry. Neither is
/// mutated after startup, so concurrent reads need no synchronization.
pub struct ServerState {
    pub config: Arc<Config>,
    pub handlers: HandlerSet,
}

/// The server: construct with a resolved [`Config`] and a [`HandlerSet`],
/// then call [`Server::serve_forever`] (blocking) or [`Server::run`]
/// (async).
pub struct Server {
    state: Arc<ServerState>,
}

impl Server {
    pub fn new(config: Config, handlers: HandlerSet) -> Self {
        Self {
            state: Arc::new(ServerState {
                config: Arc::new(config),
                handlers,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Bind the listener and run the accept loop on the current runtime
    /// until Ctrl-C.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.state.config.socket_addr()?;
        let listener = bind_listener(addr)?;
        logger::log_server_start(&addr, self.state.config.as_ref());
        server_loop::run_accept_loop(listener, Arc::clone(&self.state)).await;
        Ok(())
    }

    /// Build a runtime matching the configured concurrency mode and block
    /// on [`Server::run`].
    pub fn serve_forever(&self) -> Result<(), Box<dyn std::error::Error>> {
        let runtime = if self.state.config.server_multithreaded {
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
        } else {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
        };
        runtime.block_on(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_exposes_resolved_config() {
        let mut config = Config::default();
        config.server_port = 8080;
        let server = Server::new(config, HandlerSet::new());
        assert_eq!(server.config().server_port, 8080);
    }
}
