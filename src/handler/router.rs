//! Request lifecycle and routing dispatch
//!
//! Entry point for every parsed request: decode the query string and form
//! body, pick the static or routed branch, run the resolved handler, and
//! finalize the wire response. Every failure here is terminal for the
//! request only.

use crate::config::Config;
use crate::handler::context::{HandlerFn, Outcome, RequestContext, RequestError};
use crate::handler::static_files::{self, StaticOutcome};
use crate::http::{self, date, query, Body};
use crate::logger::{self, AccessLogEntry};
use crate::server::ServerState;
use http_body_util::BodyExt;
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, Response, StatusCode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling.
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<ServerState>,
    remote_addr: SocketAddr,
) -> Result<Response<Body>, hyper::Error> {
    let started = Instant::now();

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_str(&req, "referer");
    entry.user_agent = header_str(&req, "user-agent");

    let (response, body_bytes) = dispatch(req, &state).await?;

    if state.config.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = body_bytes;
        entry.elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.access_log_format);
    }

    Ok(response)
}

/// Route the request to the static branch or a registered handler and
/// produce the response plus its body size (for the access log).
async fn dispatch(
    req: Request<Incoming>,
    state: &Arc<ServerState>,
) -> Result<(Response<Body>, usize), hyper::Error> {
    let config = state.config.as_ref();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    // Static branch: read-only, so POST is refused before the body is read.
    if path.starts_with(config.static_url_prefix.as_str()) {
        if method == Method::POST {
            logger::log_warning(&format!("POST refused on static path {path}"));
            return Ok((http::build_405_response(), 0));
        }
        let if_modified_since = header_str(&req, "if-modified-since");
        return Ok(serve_static_response(&path, if_modified_since.as_deref(), config).await);
    }

    // Routed branch: decode inputs, then resolve and run the handler.
    let query_string = req.uri().query().unwrap_or("").to_string();
    let is_xhr = req.headers().contains_key("x-requested-with");
    let content_type = header_str(&req, "content-type");
    let body = if method == Method::POST {
        req.collect().await?.to_bytes()
    } else {
        Bytes::new()
    };

    let Some(handler) = resolve_handler(&method, &path, config, state.as_ref()) else {
        logger::log_warning(&format!("No handler for {method} {path}"));
        return Ok((http::build_404_response("Not found"), 0));
    };

    let mut ctx = RequestContext::new(
        method,
        path,
        query_string.clone(),
        query::parse_query(&query_string),
        query::parse_form(content_type.as_deref(), &body),
        is_xhr,
        Arc::clone(&state.config),
    );

    match handler(&mut ctx) {
        Outcome::Continue => Ok(finalize_response(ctx)),
        Outcome::AlreadyResponded => Ok(verbatim_response(ctx)),
        Outcome::Error(err) => {
            logger::log_warning(&format!("{} {}: {err}", ctx.method, ctx.path));
            Ok(error_response(&err))
        }
    }
}

/// Resolve `(method, path)` to a registered handler.
///
/// A route table entry is authoritative: when one exists, only the handler
/// it names is considered. Without an entry, the convention name
/// `routed_<path>` (slashes stripped) is looked up instead.
fn resolve_handler<'a>(
    method: &Method,
    path: &str,
    config: &Config,
    state: &'a ServerState,
) -> Option<&'a HandlerFn> {
    let name = config
        .route
        .lookup(method.as_str(), path)
        .map_or_else(|| format!("routed_{}", path.trim_matches('/')), String::from);
    state.handlers.get(&name)
}

/// Turn a static outcome into its wire response.
async fn serve_static_response(
    path: &str,
    if_modified_since: Option<&str>,
    config: &Config,
) -> (Response<Body>, usize) {
    match static_files::serve_static(path, if_modified_since, config).await {
        StaticOutcome::Served {
            file,
            length,
            content_type,
            last_modified,
        } => {
            let response = Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", content_type)
                .header("Content-Length", length)
                .header("Last-Modified", date::http_date_from_epoch(last_modified))
                .header("Expires", date::expires_after(config.static_cache))
                .body(http::file_body(file))
                .unwrap_or_else(|e| {
                    logger::log_error(&format!("Failed to build static response: {e}"));
                    internal_error()
                });
            (response, usize::try_from(length).unwrap_or(usize::MAX))
        }
        StaticOutcome::NotModified => (http::build_304_response(), 0),
        StaticOutcome::NotFound => (http::build_404_response("Not found"), 0),
    }
}

/// Normal finalization: fill in Content-Type and Content-Length where the
/// handler did not set them, then write status, headers and content.
fn finalize_response(ctx: RequestContext) -> (Response<Body>, usize) {
    let has_header = |name: &str| {
        ctx.response_headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case(name))
    };

    let mut builder = Response::builder().status(ctx.status);
    if !has_header("content-type") {
        builder = builder.header("Content-Type", ctx.content_type.as_str());
    }
    if !has_header("content-length") {
        builder = builder.header("Content-Length", ctx.content.len());
    }
    for (name, value) in &ctx.response_headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let length = ctx.content.len();
    let response = builder
        .body(http::full_body(ctx.content))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            internal_error()
        });
    (response, length)
}

/// The handler produced complete framing; write it without touching the
/// headers.
fn verbatim_response(ctx: RequestContext) -> (Response<Body>, usize) {
    let mut builder = Response::builder().status(ctx.status);
    for (name, value) in &ctx.response_headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let length = ctx.content.len();
    let response = builder
        .body(http::full_body(ctx.content))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            internal_error()
        });
    (response, length)
}

fn error_response(err: &RequestError) -> (Response<Body>, usize) {
    let response = match err.status() {
        StatusCode::METHOD_NOT_ALLOWED => http::build_405_response(),
        _ => http::build_404_response(&err.to_string()),
    };
    (response, 0)
}

fn internal_error() -> Response<Body> {
    let mut response = Response::new(http::full_body("500 Internal Server Error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

fn header_str(req: &Request<Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: hyper::Version) -> &'static str {
    if version == hyper::Version::HTTP_10 {
        "1.0"
    } else if version == hyper::Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}
