// Configuration types
// The immutable record every other component reads, plus the route table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Server configuration, created once at startup and never mutated after.
///
/// Field names mirror the JSON config file keys.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(rename = "SERVER_ADDRESS")]
    pub server_address: String,
    #[serde(rename = "SERVER_PORT")]
    pub server_port: u16,
    /// `true` spawns a task per connection; `false` serves connections one
    /// at a time.
    #[serde(rename = "SERVER_MULTITHREADED")]
    pub server_multithreaded: bool,
    /// URL prefix identifying filesystem-served requests.
    #[serde(rename = "STATIC_URL_PREFIX")]
    pub static_url_prefix: String,
    #[serde(rename = "STATIC_FOLDER")]
    pub static_folder: PathBuf,
    /// Client cache TTL in seconds, advertised via `Expires`.
    #[serde(rename = "STATIC_CACHE")]
    pub static_cache: u64,
    #[serde(rename = "TEMPLATE_FOLDER")]
    pub template_folder: PathBuf,
    #[serde(rename = "ROUTE")]
    pub route: RouteTable,
    #[serde(rename = "ACCESS_LOG")]
    pub access_log: bool,
    /// `common`, `combined`, `json`, or a custom `$var` pattern.
    #[serde(rename = "ACCESS_LOG_FORMAT")]
    pub access_log_format: String,
    /// Access log file path; stdout when unset.
    #[serde(rename = "ACCESS_LOG_FILE")]
    pub access_log_file: Option<String>,
    /// Error log file path; stderr when unset.
    #[serde(rename = "ERROR_LOG_FILE")]
    pub error_log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut get_routes = HashMap::new();
        get_routes.insert("/".to_string(), "default_response".to_string());
        let mut methods = HashMap::new();
        methods.insert("GET".to_string(), get_routes.clone());
        methods.insert("POST".to_string(), get_routes);
        let mut route = RouteTable(methods);
        route.normalize();

        Self {
            server_address: "0.0.0.0".to_string(),
            server_port: 80,
            server_multithreaded: true,
            static_url_prefix: "/static".to_string(),
            static_folder: cwd.join("static"),
            static_cache: 604_800,
            template_folder: cwd.join("templates"),
            route,
            access_log: true,
            access_log_format: "common".to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Route table: HTTP method to a map of URL path to handler name.
///
/// Matching is exact string equality after stripping leading and trailing
/// slashes; there is no pattern or segment matching.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RouteTable(pub HashMap<String, HashMap<String, String>>);

impl RouteTable {
    /// Look up the handler name configured for `(method, path)`.
    pub fn lookup(&self, method: &str, path: &str) -> Option<&str> {
        self.0
            .get(method)?
            .get(path.trim_matches('/'))
            .map(String::as_str)
    }

    /// Normalize path keys once so lookups are a direct map access.
    pub(super) fn normalize(&mut self) {
        for paths in self.0.values_mut() {
            let normalized = paths
                .drain()
                .map(|(path, handler)| (path.trim_matches('/').to_string(), handler))
                .collect();
            *paths = normalized;
        }
    }
}
