//! Demo server
//!
//! Registers a few example handlers and serves forever. Pass a config file
//! path as the first argument; without one, `config.json` in the working
//! directory is used (defaults apply if it does not exist).

use hyper::Method;
use minihttpd::{logger, Config, HandlerSet, Outcome, RequestError, Server};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = Config::resolve(Some(Path::new(&config_path)))?;
    logger::init(&config)?;

    let mut handlers = HandlerSet::new();

    // Default route target for "/" (GET and POST in the default table).
    handlers.register("default_response", |ctx| {
        ctx.content = format!(
            "<!DOCTYPE html>\n<html>\n<body><h1>Hello world!</h1>\nHTTP Method: {}\n</body>\n</html>",
            ctx.method
        );
        Outcome::Continue
    });

    // GET /testget: echoes the decoded query string and offers a form that
    // posts repeated parameters to /testpost.
    handlers.register("routed_testget", |ctx| {
        let mut query_pairs: Vec<String> = ctx
            .query
            .iter()
            .map(|(k, vs)| format!("{k}={vs:?}"))
            .collect();
        query_pairs.sort();
        ctx.content = format!(
            r#"<!DOCTYPE html>
<html>
<h1>Test GET</h1>
Query string: {}<br><br>
<form action="/testpost" method="POST">
Post param: <input name="post_param"><br>
Array param (first): <input name="param_array"><br>
Array param (second): <input name="param_array"><br>
Bracket param (first): <input name="param[]"><br>
Bracket param (second): <input name="param[]"><br>
<input type="submit">
</form>
</html>"#,
            query_pairs.join(", ")
        );
        Outcome::Continue
    });

    // POST /testpost: echoes single and repeated form parameters.
    handlers.register("routed_testpost", |ctx| {
        if ctx.method != Method::POST {
            return Outcome::Error(RequestError::MethodNotAllowed);
        }
        let post_param = ctx.safe_param("post_param");
        let array_values = ctx
            .form
            .get("param_array")
            .map(|vs| vs.join(", "))
            .unwrap_or_default();
        let bracket_values = ctx
            .form
            .get("param[]")
            .map(|vs| vs.join(", "))
            .unwrap_or_default();
        ctx.content = format!(
            r#"<!DOCTYPE html>
<html>
<h1>Test POST</h1>
Post param: {post_param}<br>
Array param values: {array_values}<br>
Bracket param values: {bracket_values}<br>
</html>"#
        );
        Outcome::Continue
    });

    Server::new(config, handlers).serve_forever()
}
