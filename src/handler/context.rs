//! Request context and the application handler registry
//!
//! A [`RequestContext`] is owned by one connection for the duration of a
//! request: parsed inputs on one side, mutable response state on the other.
//! Applications extend the server by registering named handler closures in
//! a [`HandlerSet`]; the router resolves names from the route table or the
//! `routed_<path>` convention.

use crate::config::Config;
use crate::http::ParamMap;
use crate::template::{self, TemplateError};
use hyper::{Method, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Terminal, per-request failures. Each maps to an HTTP status; none of
/// them ever tears down the server.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Template missing")]
    TemplateMissing,
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::TemplateMissing => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<TemplateError> for RequestError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::Missing(_) => Self::TemplateMissing,
            TemplateError::Read { .. } | TemplateError::Pattern(_) => Self::NotFound,
        }
    }
}

/// What a handler tells the lifecycle to do next.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Finalize normally: fill in missing Content-Type/Content-Length from
    /// the context and write status, headers and content.
    Continue,
    /// The context already holds complete framing; write it verbatim.
    AlreadyResponded,
    /// Answer with the error's status and message.
    Error(RequestError),
}

/// Per-request state handed to handlers.
pub struct RequestContext {
    pub method: Method,
    /// URL path, query string excluded.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query_string: String,
    /// Decoded query parameters, repeated keys in order.
    pub query: ParamMap,
    /// Decoded POST form fields, same shape as `query`.
    pub form: ParamMap,
    /// Whether the request carried `X-Requested-With` (sent by XHR clients).
    pub is_xhr: bool,
    pub config: Arc<Config>,

    // Response state, mutated by the handler.
    pub status: StatusCode,
    pub response_headers: HashMap<String, String>,
    pub content: String,
    pub content_type: String,
}

impl RequestContext {
    pub fn new(
        method: Method,
        path: String,
        query_string: String,
        query: ParamMap,
        form: ParamMap,
        is_xhr: bool,
        config: Arc<Config>,
    ) -> Self {
        Self {
            method,
            path,
            query_string,
            query,
            form,
            is_xhr,
            config,
            status: StatusCode::OK,
            response_headers: HashMap::new(),
            content: String::new(),
            content_type: "text/html; charset=UTF-8".to_string(),
        }
    }

    /// First query value for `name`, if any.
    pub fn first_query(&self, name: &str) -> Option<&str> {
        self.query.get(name)?.first().map(String::as_str)
    }

    /// First form value for `name`, if any.
    pub fn first_form(&self, name: &str) -> Option<&str> {
        self.form.get(name)?.first().map(String::as_str)
    }

    /// First form value for `name`, HTML-escaped; empty string when absent.
    pub fn safe_param(&self, name: &str) -> String {
        self.first_form(name).map(html_escape).unwrap_or_default()
    }

    /// Set a response header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response_headers
            .insert(name.to_string(), value.to_string());
    }

    /// Render a template from the configured template folder into the
    /// response content.
    pub fn render_template(
        &mut self,
        name: &str,
        substitutions: &HashMap<String, String>,
    ) -> Result<(), TemplateError> {
        self.content = template::render(&self.config.template_folder, name, substitutions)?;
        Ok(())
    }
}

/// HTML-escape a parameter value for safe interpolation into markup.
fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A registered handler: reads the context, mutates its response fields,
/// and reports how the lifecycle should finish the request.
pub type HandlerFn = dyn Fn(&mut RequestContext) -> Outcome + Send + Sync;

/// The application's named handlers, built at startup and read-only while
/// the server runs.
#[derive(Default)]
pub struct HandlerSet {
    handlers: HashMap<String, Box<HandlerFn>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`. Route table entries refer to this
    /// name; the convention route for path `/foo` looks up `routed_foo`.
    pub fn register<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext) -> Outcome + Send + Sync + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<&HandlerFn> {
        self.handlers.get(name).map(Box::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with_form(pairs: &[(&str, &[&str])]) -> RequestContext {
        let form: ParamMap = pairs
            .iter()
            .map(|(k, vs)| {
                (
                    (*k).to_string(),
                    vs.iter().map(|v| (*v).to_string()).collect(),
                )
            })
            .collect();
        RequestContext::new(
            Method::POST,
            "/test".to_string(),
            String::new(),
            ParamMap::new(),
            form,
            false,
            Arc::new(Config::default()),
        )
    }

    #[test]
    fn test_default_response_state() {
        let ctx = context_with_form(&[]);
        assert_eq!(ctx.status, StatusCode::OK);
        assert_eq!(ctx.content_type, "text/html; charset=UTF-8");
        assert!(ctx.content.is_empty());
        assert!(ctx.response_headers.is_empty());
    }

    #[test]
    fn test_safe_param_escapes_markup() {
        let ctx = context_with_form(&[("comment", &["<b>\"hi\" & bye</b>"])]);
        assert_eq!(
            ctx.safe_param("comment"),
            "&lt;b&gt;&quot;hi&quot; &amp; bye&lt;/b&gt;"
        );
    }

    #[test]
    fn test_safe_param_absent_is_empty() {
        let ctx = context_with_form(&[]);
        assert_eq!(ctx.safe_param("missing"), "");
    }

    #[test]
    fn test_first_form_takes_first_of_repeated() {
        let ctx = context_with_form(&[("param_array", &["1", "2"])]);
        assert_eq!(ctx.first_form("param_array"), Some("1"));
    }

    #[test]
    fn test_first_query_takes_first_of_repeated() {
        let mut ctx = context_with_form(&[]);
        ctx.query
            .insert("a".to_string(), vec!["1".to_string(), "2".to_string()]);
        assert_eq!(ctx.first_query("a"), Some("1"));
        assert_eq!(ctx.first_query("b"), None);
    }

    #[test]
    fn test_handler_set_lookup() {
        let mut handlers = HandlerSet::new();
        handlers.register("say_hello", |ctx| {
            ctx.content = "hi".to_string();
            Outcome::Continue
        });
        assert!(handlers.get("say_hello").is_some());
        assert!(handlers.get("routed_nothing").is_none());
    }

    #[test]
    fn test_render_template_into_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("status.html"), "<p>GPIO is {{STATE}}</p>").unwrap();
        let mut config = Config::default();
        config.template_folder = dir.path().to_path_buf();

        let mut ctx = context_with_form(&[]);
        ctx.config = Arc::new(config);

        let mut vars = HashMap::new();
        vars.insert("{{STATE}}".to_string(), "on".to_string());
        ctx.render_template("status.html", &vars).unwrap();
        assert_eq!(ctx.content, "<p>GPIO is on</p>");
    }

    #[test]
    fn test_missing_template_maps_to_404() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.template_folder = dir.path().to_path_buf();

        let mut ctx = context_with_form(&[]);
        ctx.config = Arc::new(config);

        let err = ctx
            .render_template("absent.html", &HashMap::new())
            .unwrap_err();
        let request_err = RequestError::from(err);
        assert_eq!(request_err, RequestError::TemplateMissing);
        assert_eq!(request_err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(RequestError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(RequestError::TemplateMissing.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RequestError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
