//! Cache expiration policy
//!
//! Each upstream payload embeds its own freshness signal (a "last updated"
//! or "creation time" field at a schema-specific path). The TTL for a
//! cached response is derived from that signal: fresh data is cached until
//! roughly an hour after it was produced, floored at ten minutes so a stale
//! feed never turns into a thundering herd against the upstream.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::xml::XmlObject;

/// Lower bound on any computed TTL.
pub const MIN_TTL: Duration = Duration::from_secs(600);

/// TTL used when the payload carries no usable timestamp.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Parses a payload timestamp.
///
/// The alerts, forecast, and glance feeds use RFC 3339; the current
/// observations feed uses RFC 2822.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .or_else(|_| DateTime::parse_from_rfc2822(raw.trim()))
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Computes the TTL for a payload produced at `timestamp`.
///
/// With a timestamp: `max(10 minutes, 1 hour - age)`. The floor applies on
/// its own; a payload older than an hour still caches for ten minutes, not
/// a full hour. A future timestamp can push the TTL past an hour; there is
/// no upper clamp. Without a timestamp: one hour flat.
pub fn compute_ttl(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    match timestamp {
        Some(timestamp) => {
            let age = (now - timestamp).num_seconds();
            let remaining = DEFAULT_TTL.as_secs() as i64 - age;
            Duration::from_secs(remaining.max(MIN_TTL.as_secs() as i64) as u64)
        }
        None => DEFAULT_TTL,
    }
}

/// Looks up `timestamp_path` in a parsed payload and computes the TTL.
///
/// Missing or unparseable timestamps fall back to the flat default.
pub fn ttl_for(document: &XmlObject, timestamp_path: &[&str], now: DateTime<Utc>) -> Duration {
    let timestamp = document.text_at(timestamp_path).and_then(parse_timestamp);
    compute_ttl(timestamp, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;
    use chrono::TimeZone;

    fn at(secs_ago: i64) -> (Option<DateTime<Utc>>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid time");
        (Some(now - chrono::Duration::seconds(secs_ago)), now)
    }

    #[test]
    fn test_no_timestamp_gives_flat_hour() {
        let now = Utc::now();
        assert_eq!(compute_ttl(None, now), Duration::from_secs(3600));
    }

    #[test]
    fn test_thirty_minute_old_payload_caches_for_the_remainder() {
        let (ts, now) = at(1800);
        assert_eq!(compute_ttl(ts, now), Duration::from_secs(1800));
    }

    #[test]
    fn test_stale_payload_floors_at_ten_minutes() {
        // 55 minutes old: 3600 - 3300 = 300, floored to 600.
        let (ts, now) = at(3300);
        assert_eq!(compute_ttl(ts, now), Duration::from_secs(600));
    }

    #[test]
    fn test_payload_older_than_an_hour_still_floors_not_resets() {
        let (ts, now) = at(7200);
        assert_eq!(compute_ttl(ts, now), Duration::from_secs(600));
    }

    #[test]
    fn test_future_timestamp_exceeds_an_hour() {
        let (ts, now) = at(-600);
        assert_eq!(compute_ttl(ts, now), Duration::from_secs(4200));
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let parsed = parse_timestamp("2024-01-01T00:00:00Z").expect("rfc3339");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid"));
    }

    #[test]
    fn test_parse_timestamp_rfc2822() {
        let parsed = parse_timestamp("Mon, 11 Feb 2008 06:51:00 -0800").expect("rfc2822");
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2008, 2, 11, 14, 51, 0).single().expect("valid")
        );
    }

    #[test]
    fn test_parse_timestamp_garbage_is_none() {
        assert!(parse_timestamp("eleven o'clock").is_none());
    }

    #[test]
    fn test_ttl_for_reads_the_embedded_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).single().expect("valid");
        let parsed = parse("<feed><updated>2024-01-01T00:00:00Z</updated></feed>");
        assert_eq!(
            ttl_for(&parsed.root, &["feed", "updated"], now),
            Duration::from_secs(1800)
        );
    }

    #[test]
    fn test_ttl_for_missing_path_uses_default() {
        let parsed = parse("<feed><title>alerts</title></feed>");
        assert_eq!(
            ttl_for(&parsed.root, &["feed", "updated"], Utc::now()),
            DEFAULT_TTL
        );
    }
}
