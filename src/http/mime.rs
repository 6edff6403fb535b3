//! MIME type lookup
//!
//! Maps a file's extension to its Content-Type. The table is a fixed,
//! process-wide match and never changes during a run.

use std::path::Path;

/// Guess the Content-Type of a file from its extension.
///
/// The extension is compared case-insensitively; anything not in the table
/// falls back to `application/octet-stream`.
///
/// # Examples
/// ```
/// use minihttpd::http::mime::guess_type;
/// use std::path::Path;
/// assert_eq!(guess_type(Path::new("index.html")), "text/html");
/// assert_eq!(guess_type(Path::new("app.CSS")), "text/css");
/// assert_eq!(guess_type(Path::new("data.bin")), "application/octet-stream");
/// ```
pub fn guess_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        // Text
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",

        // Scripts and data
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Audio / video
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg" | "ogv") => "video/ogg",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Archives and documents
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(guess_type(Path::new("page.html")), "text/html");
        assert_eq!(guess_type(Path::new("style.css")), "text/css");
        assert_eq!(guess_type(Path::new("app.js")), "application/javascript");
        assert_eq!(guess_type(Path::new("logo.png")), "image/png");
        assert_eq!(guess_type(Path::new("clip.mp4")), "video/mp4");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(guess_type(Path::new("INDEX.HTML")), "text/html");
        assert_eq!(guess_type(Path::new("photo.JPeG")), "image/jpeg");
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        assert_eq!(guess_type(Path::new("blob.xyz")), "application/octet-stream");
        assert_eq!(guess_type(Path::new("no_extension")), "application/octet-stream");
    }
}
