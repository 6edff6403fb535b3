//! HTTP response building
//!
//! Shared body type and builders for the fixed status responses. Static file
//! bodies are streamed in chunks so a large file is never held in memory.

use futures_util::stream;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::Response;
use tokio::io::AsyncReadExt;

/// Body type shared by every response this server produces. Boxed `Send`
/// so connections can be served on spawned tasks.
pub type Body = BoxBody<Bytes, std::io::Error>;

/// Read size for streamed file bodies.
const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// Box a fully buffered body.
pub fn full_body(data: impl Into<Bytes>) -> Body {
    Full::new(data.into())
        .map_err(std::io::Error::other)
        .boxed()
}

/// An empty body.
pub fn empty_body() -> Body {
    full_body(Bytes::new())
}

/// Stream a file as a sequence of fixed-size chunks.
pub fn file_body(file: tokio::fs::File) -> Body {
    let chunks = stream::unfold(file, |mut file| async move {
        let mut buf = vec![0u8; FILE_CHUNK_SIZE];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(Frame::data(Bytes::from(buf))), file))
            }
            Err(e) => Some((Err(e), file)),
        }
    });
    StreamBody::new(chunks).boxed()
}

/// Build a bare 304 Not Modified response: status line only, no body and no
/// negotiation headers.
pub fn build_304_response() -> Response<Body> {
    Response::builder()
        .status(304)
        .body(empty_body())
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(empty_body())
        })
}

/// Build a 404 Not Found response.
pub fn build_404_response(message: &str) -> Response<Body> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(full_body(format!("404 {message}")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full_body("404 Not Found"))
        })
}

/// Build a 405 Method Not Allowed response.
pub fn build_405_response() -> Response<Body> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD")
        .body(full_body("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full_body("405 Method Not Allowed"))
        })
}

/// Log a response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
