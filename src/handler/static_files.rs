//! Static file serving
//!
//! Resolves a URL path under the static folder and decides between a full
//! response, a conditional 304, and a 404, based on the file's modification
//! time and the client's `If-Modified-Since` header.

use crate::config::Config;
use crate::http::date;
use crate::logger;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;
use tokio::fs;

/// What a static request resolves to.
pub enum StaticOutcome {
    /// Serve the file: 200 with Content-Type, Content-Length,
    /// Last-Modified and Expires.
    Served {
        file: fs::File,
        length: u64,
        content_type: &'static str,
        /// Modification time in whole seconds past the epoch.
        last_modified: i64,
    },
    /// The client's cached copy is still valid: bare 304.
    NotModified,
    /// Missing, not a regular file, or unreadable: 404.
    NotFound,
}

/// Negotiate a static request.
///
/// The file's mtime is truncated to whole seconds before comparison. An
/// `If-Modified-Since` value that fails to parse counts as the epoch, so
/// the file is served. Filesystem errors of any kind degrade to
/// [`StaticOutcome::NotFound`]; they never abort the request loop.
pub async fn serve_static(
    url_path: &str,
    if_modified_since: Option<&str>,
    config: &Config,
) -> StaticOutcome {
    let Some(file_path) = translate_path(url_path, config) else {
        return StaticOutcome::NotFound;
    };

    let metadata = match fs::metadata(&file_path).await {
        Ok(m) if m.is_file() => m,
        _ => return StaticOutcome::NotFound,
    };

    let last_modified = match metadata.modified() {
        Ok(t) => match t.duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            Err(_) => 0,
        },
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read mtime of '{}': {e}",
                file_path.display()
            ));
            return StaticOutcome::NotFound;
        }
    };

    let threshold = if_modified_since
        .and_then(date::parse_http_date)
        .map_or(0, |t| t.timestamp());

    if last_modified <= threshold {
        return StaticOutcome::NotModified;
    }

    let file = match fs::File::open(&file_path).await {
        Ok(f) => f,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to open '{}': {e}",
                file_path.display()
            ));
            return StaticOutcome::NotFound;
        }
    };

    StaticOutcome::Served {
        file,
        length: metadata.len(),
        content_type: crate::http::mime::guess_type(&file_path),
        last_modified,
    }
}

/// Translate a URL path to a filesystem path under the static folder.
///
/// The static URL prefix is stripped as a literal prefix and the remainder
/// joined onto the static root. The resolved path must stay inside the
/// canonicalized root; traversal attempts are logged and refused.
fn translate_path(url_path: &str, config: &Config) -> Option<PathBuf> {
    let prefix = config.static_url_prefix.as_str();
    let remainder = url_path.strip_prefix(prefix).unwrap_or(url_path);
    let candidate = config.static_folder.join(remainder.trim_start_matches('/'));

    let root = match config.static_folder.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static folder '{}' not accessible: {e}",
                config.static_folder.display()
            ));
            return None;
        }
    };

    // A missing file fails canonicalization; that is the ordinary 404 path
    // and not worth logging.
    let resolved = candidate.canonicalize().ok()?;
    if !resolved.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {url_path} -> {}",
            resolved.display()
        ));
        return None;
    }
    Some(resolved)
}
