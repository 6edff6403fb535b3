//! Query string and form body decoding
//!
//! Both the URL query string and POST bodies decode into the same shape: a
//! map from key to the ordered sequence of values seen for that key, so
//! repeated parameters (`a=1&a=2`, `param[]=x&param[]=y`) are preserved.

use std::collections::HashMap;

/// Decoded parameters: key to values in submission order.
pub type ParamMap = HashMap<String, Vec<String>>;

/// Decode a raw query string (without the leading `?`).
pub fn parse_query(query: &str) -> ParamMap {
    parse_urlencoded(query.as_bytes())
}

/// Decode a POST body according to its `Content-Type`.
///
/// `application/x-www-form-urlencoded` and `multipart/form-data` are
/// understood; any other (or missing) content type yields an empty map
/// rather than an error.
pub fn parse_form(content_type: Option<&str>, body: &[u8]) -> ParamMap {
    match content_type {
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => parse_urlencoded(body),
        Some(ct) if ct.starts_with("multipart/form-data") => boundary_param(ct)
            .map(|b| parse_multipart(&b, body))
            .unwrap_or_default(),
        _ => ParamMap::new(),
    }
}

fn parse_urlencoded(input: &[u8]) -> ParamMap {
    let mut params = ParamMap::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

/// Extract the `boundary` parameter from a multipart Content-Type value.
fn boundary_param(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        if name.eq_ignore_ascii_case("boundary") {
            Some(value.trim_matches('"').to_string())
        } else {
            None
        }
    })
}

/// Minimal `multipart/form-data` decoder for text fields.
///
/// Parts carrying a `filename` are skipped: file uploads are out of scope.
/// Non-UTF-8 bytes in a field value are replaced rather than rejected.
fn parse_multipart(boundary: &str, body: &[u8]) -> ParamMap {
    let mut params = ParamMap::new();
    let text = String::from_utf8_lossy(body);
    let delimiter = format!("--{boundary}");

    for segment in text.split(delimiter.as_str()) {
        // The preamble before the first boundary and the "--" terminator
        // after the last one are not parts.
        if segment.is_empty() || segment.starts_with("--") {
            continue;
        }
        let part = segment.strip_prefix("\r\n").unwrap_or(segment);
        let Some((raw_headers, raw_value)) = part.split_once("\r\n\r\n") else {
            continue;
        };
        let Some(name) = field_name(raw_headers) else {
            continue;
        };
        let value = raw_value.strip_suffix("\r\n").unwrap_or(raw_value);
        params.entry(name).or_default().push(value.to_string());
    }
    params
}

/// Pull the field name out of a part's Content-Disposition header.
fn field_name(raw_headers: &str) -> Option<String> {
    let disposition = raw_headers
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("content-disposition:"))?;
    if disposition.contains("filename=") {
        return None;
    }
    let after = disposition.split_once("name=\"")?.1;
    let name = after.split_once('"')?.0;
    Some(name.to_string())
}
