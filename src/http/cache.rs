//! HTTP cache validation module
//!
//! `Last-Modified` formatting and `If-Modified-Since` evaluation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Format a modification time as an HTTP date
///
/// # Examples
/// ```
/// use std::time::{Duration, UNIX_EPOCH};
/// use servedir::http::cache::format_last_modified;
/// let t = UNIX_EPOCH + Duration::from_secs(784_887_151);
/// assert_eq!(format_last_modified(t), "Tue, 15 Nov 1994 08:12:31 GMT");
/// ```
pub fn format_last_modified(modified: SystemTime) -> String {
    httpdate::fmt_http_date(modified)
}

/// Check whether the client's cached copy is still current
///
/// `If-None-Match` takes precedence, and this server sends no `ETag`, so its
/// presence disables the date check. Times compare at second precision
/// because HTTP dates carry no fractions.
///
/// # Returns
/// Returns true if a 304 should be sent
pub fn is_not_modified(
    if_modified_since: Option<&str>,
    if_none_match: Option<&str>,
    modified: SystemTime,
) -> bool {
    if if_none_match.is_some() {
        return false;
    }
    let Some(header) = if_modified_since else {
        return false;
    };
    let Ok(since) = httpdate::parse_http_date(header.trim()) else {
        return false;
    };

    truncate_to_secs(modified) <= since
}

fn truncate_to_secs(time: SystemTime) -> SystemTime {
    time.duration_since(UNIX_EPOCH)
        .map_or(time, |d| UNIX_EPOCH + Duration::from_secs(d.as_secs()))
}
