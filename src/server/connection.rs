// Connection handling module
// Serves one accepted TCP connection with the HTTP/1.x request handler.

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

use super::ServerState;
use crate::handler;
use crate::logger;

/// Serve a single connection to completion.
///
/// In multithreaded mode this runs on its own spawned task; in serial mode
/// the accept loop awaits it directly.
pub async fn serve_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<ServerState>,
) {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req| {
        let state = Arc::clone(&state);
        async move { handler::handle_request(req, state, peer_addr).await }
    });

    // Title-case header names so the wire matches the documented
    // Content-Type / Content-Length / Last-Modified / Expires spelling.
    let connection = http1::Builder::new()
        .title_case_headers(true)
        .serve_connection(io, service);

    if let Err(err) = connection.await {
        logger::log_connection_error(&err);
    }
}
