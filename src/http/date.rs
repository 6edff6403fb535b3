//! HTTP date handling
//!
//! Formats and parses IMF-fixdate timestamps (RFC 7231) for the
//! `Last-Modified`, `Expires` and `If-Modified-Since` headers.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// IMF-fixdate layout, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a UTC timestamp as an HTTP-date.
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format(IMF_FIXDATE).to_string()
}

/// Format `seconds` past the Unix epoch as an HTTP-date.
///
/// Out-of-range values collapse to the epoch rather than failing, so a
/// nonsensical filesystem timestamp still yields a valid header.
pub fn http_date_from_epoch(seconds: i64) -> String {
    let time = DateTime::<Utc>::from_timestamp(seconds, 0)
        .unwrap_or_else(|| DateTime::<Utc>::from_timestamp_nanos(0));
    http_date(time)
}

/// Cap for cache TTLs: ten years, far past any sensible `Expires` horizon
/// and safely inside chrono's arithmetic range.
const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// HTTP-date for `now + ttl_seconds`, used for the `Expires` header.
pub fn expires_after(ttl_seconds: u64) -> String {
    let capped = i64::try_from(ttl_seconds)
        .unwrap_or(MAX_TTL_SECONDS)
        .min(MAX_TTL_SECONDS);
    http_date(Utc::now() + Duration::seconds(capped))
}

/// Parse an HTTP-date header value.
///
/// Accepts IMF-fixdate first and falls back to the RFC 2822 forms chrono
/// understands. Returns `None` when the value does not parse; callers treat
/// that as the epoch per the conditional-request contract.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, IMF_FIXDATE) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
