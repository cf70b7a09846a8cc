//! Time related utils.
//!
//! Azure Storage signs over two textual timestamp formats:
//!
//! - HTTP dates (RFC 1123) in the `x-ms-date` header.
//! - ISO 8601 UTC with second precision (`2022-03-01T08:12:34Z`) in SAS
//!   fields.

use chrono::SecondsFormat;
use chrono::Utc;

use crate::Error;

/// DateTime in UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// Get the current time in UTC.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a time into an HTTP date: `Tue, 01 Mar 2022 08:12:34 GMT`.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Format a time into the SAS wire form: `2022-03-01T08:12:34Z`.
pub fn format_rfc3339_zulu(t: DateTime) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC 3339 timestamp, e.g. `2022-03-01T08:12:34Z`.
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            Error::request_invalid(format!("invalid timestamp: {s}")).with_source(e)
        })
}
