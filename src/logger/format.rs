//! Access log formats
//!
//! One entry per finished request, rendered as Common Log Format,
//! Apache/Nginx combined, JSON, or a custom `$var` pattern.

use chrono::{DateTime, Local};

/// Everything an access log line can mention.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string without the leading `?`, if any.
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub elapsed_us: u64,
}

impl AccessLogEntry {
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            elapsed_us: 0,
        }
    }

    /// Render according to the configured format name.
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.common_line(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "json" => self.json_line(),
            "common" => self.common_line(),
            pattern => self.custom_line(pattern),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {}{} HTTP/{}",
            self.method,
            self.path,
            self.query
                .as_ref()
                .map(|q| format!("?{q}"))
                .unwrap_or_default(),
            self.http_version
        )
    }

    /// `host - - [time] "request" status bytes`
    fn common_line(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn json_line(&self) -> String {
        let optional = |v: &Option<String>| {
            v.as_ref()
                .map_or_else(|| "null".to_string(), |s| format!("\"{}\"", escape_json(s)))
        };
        format!(
            r#"{{"remote_addr":"{}","time":"{}","method":"{}","path":"{}","query":{},"status":{},"body_bytes":{},"referer":{},"user_agent":{},"elapsed_us":{}}}"#,
            escape_json(&self.remote_addr),
            self.time.to_rfc3339(),
            escape_json(&self.method),
            escape_json(&self.path),
            optional(&self.query),
            self.status,
            self.body_bytes,
            optional(&self.referer),
            optional(&self.user_agent),
            self.elapsed_us,
        )
    }

    /// Substitute `$var` placeholders. Longer names are replaced before
    /// their prefixes so `$request_method` survives `$request`.
    fn custom_line(&self, pattern: &str) -> String {
        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace(
                "$time_local",
                &self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            )
            .replace("$request_method", &self.method)
            .replace("$request_uri", &self.path)
            .replace("$request", &self.request_line())
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
    }
}

fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
