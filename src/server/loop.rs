// Server loop module
// Accepts connections until shutdown, dispatching them per the configured
// concurrency mode.

use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::serve_connection;
use super::ServerState;
use crate::logger;

/// Run the accept loop until Ctrl-C.
///
/// Multithreaded mode spawns an independent task per accepted connection,
/// unbounded by design. Serial mode finishes each connection before the
/// next accept. Accept errors are logged and the loop keeps going.
pub async fn run_accept_loop(listener: TcpListener, state: Arc<ServerState>) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer_addr)) => {
                        if state.config.server_multithreaded {
                            tokio::spawn(serve_connection(stream, peer_addr, Arc::clone(&state)));
                        } else {
                            serve_connection(stream, peer_addr, Arc::clone(&state)).await;
                        }
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                logger::log_shutdown();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::{HandlerSet, Outcome};
    use crate::server::bind_listener;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn raw_request(addr: SocketAddr, request: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).await.unwrap();
        String::from_utf8_lossy(&reply).into_owned()
    }

    fn test_state(static_root: &std::path::Path) -> Arc<ServerState> {
        let mut config = Config::default();
        config.access_log = false;
        config.static_folder = static_root.to_path_buf();
        config.static_cache = 100;
        config.route = serde_json::from_str(r#"{"GET": {"hello": "say_hello"}}"#).unwrap();

        let mut handlers = HandlerSet::new();
        handlers.register("say_hello", |ctx| {
            ctx.content = "hi".to_string();
            Outcome::Continue
        });

        Arc::new(ServerState {
            config: Arc::new(config),
            handlers,
        })
    }

    #[tokio::test]
    async fn test_accept_loop_serves_requests() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.css"), b"body{}").unwrap();

        let state = test_state(dir.path());
        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(run_accept_loop(listener, Arc::clone(&state)));

        // Route table entry answers with the handler's content.
        let reply = raw_request(
            addr,
            "GET /hello HTTP/1.1\r\nHost: t\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(reply.starts_with("HTTP/1.1 200"), "got: {reply}");
        assert!(reply.ends_with("hi"));

        // POST under the static prefix is refused, file or no file.
        let reply = raw_request(
            addr,
            "POST /static/app.css HTTP/1.1\r\nHost: t\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(reply.starts_with("HTTP/1.1 405"), "got: {reply}");

        // Static file: 200 whose Last-Modified feeds back as a 304.
        let reply = raw_request(
            addr,
            "GET /static/app.css HTTP/1.1\r\nHost: t\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(reply.starts_with("HTTP/1.1 200"), "got: {reply}");
        assert!(reply.contains("Expires: "));
        assert!(reply.ends_with("body{}"));
        let last_modified = reply
            .lines()
            .find_map(|l| l.trim_end().strip_prefix("Last-Modified: "))
            .unwrap()
            .to_string();

        let conditional = format!(
            "GET /static/app.css HTTP/1.1\r\nHost: t\r\nIf-Modified-Since: {last_modified}\r\nConnection: close\r\n\r\n",
        );
        let reply = raw_request(addr, &conditional).await;
        assert!(reply.starts_with("HTTP/1.1 304"), "got: {reply}");

        // No route table entry, no convention handler: 404.
        let reply = raw_request(
            addr,
            "GET /nowhere HTTP/1.1\r\nHost: t\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(reply.starts_with("HTTP/1.1 404"), "got: {reply}");
    }
}
