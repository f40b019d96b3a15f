//! Timestamp parsing for archive rows and the configured cutoff date.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Parse a post timestamp from any of the export formats:
/// - legacy CSV: `2012-03-08 21:45:26 +0000`
/// - RFC 3339: `2012-03-08T21:45:26Z`
/// - `created_at` in tweets.js: `Wed Oct 10 20:19:24 +0000 2018`
/// - bare `2012-03-08 21:45:26` or `2012-03-08` (taken as UTC)
///
/// Returns `None` for anything else; callers treat that as "not older than cutoff".
pub fn parse_timestamp(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let legacy = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
    );
    if let Ok(dt) = OffsetDateTime::parse(s, &legacy) {
        return Some(dt);
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }
    let created_at = format_description!(
        "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
    );
    if let Ok(dt) = OffsetDateTime::parse(s, &created_at) {
        return Some(dt);
    }
    let naive = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(s, &naive) {
        return Some(dt.assume_utc());
    }
    let day = format_description!("[year]-[month]-[day]");
    if let Ok(d) = Date::parse(s, &day) {
        return Some(d.midnight().assume_utc());
    }
    None
}

/// Resolve the cutoff: the configured date if any, else now.
pub fn resolve_cutoff(max_date: Option<&str>) -> Result<OffsetDateTime, String> {
    match max_date.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_timestamp(s).ok_or_else(|| format!("invalid maxDate '{}'", s)),
        None => Ok(OffsetDateTime::now_utc()),
    }
}

/// Interpret a rate-limit reset header value. The live service sends epoch seconds;
/// values at or above 10^11 are taken as epoch milliseconds.
pub fn reset_from_epoch(raw: i64) -> Option<OffsetDateTime> {
    const MILLIS_THRESHOLD: i64 = 100_000_000_000;
    if raw >= MILLIS_THRESHOLD {
        OffsetDateTime::from_unix_timestamp_nanos(raw as i128 * 1_000_000).ok()
    } else {
        OffsetDateTime::from_unix_timestamp(raw).ok()
    }
}
