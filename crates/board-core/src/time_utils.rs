use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// Second-granularity key format used in stored document names and metadata.
pub const STORAGE_KEY_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Human-facing timestamp format used in reports.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Source of ingestion timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ── Formatting / parsing ─────────────────────────────────────────────────────

/// Render `ts` as a storage key, e.g. `"2024-01-15_10-30-00"`.
pub fn storage_key(ts: DateTime<Utc>) -> String {
    ts.format(STORAGE_KEY_FORMAT).to_string()
}

/// Parse a storage key back into a UTC timestamp.
///
/// Also accepts RFC 3339 strings so documents written by other tooling
/// still load. Returns `None` for anything else.
pub fn parse_storage_key(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, STORAGE_KEY_FORMAT) {
        return Some(naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    warn!("could not parse timestamp \"{}\"", s);
    None
}

/// Render `ts` for display in reports.
pub fn display_time(ts: DateTime<Utc>) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_storage_key_format() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 5).unwrap();
        assert_eq!(storage_key(ts), "2024-01-15_10-30-05");
    }

    #[test]
    fn test_parse_storage_key_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap();
        assert_eq!(parse_storage_key(&storage_key(ts)), Some(ts));
    }

    #[test]
    fn test_parse_storage_key_accepts_rfc3339() {
        let parsed = parse_storage_key("2024-01-15T10:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_storage_key_rejects_garbage() {
        assert!(parse_storage_key("yesterday").is_none());
        assert!(parse_storage_key("").is_none());
    }

    #[test]
    fn test_display_time() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 8, 5, 0).unwrap();
        assert_eq!(display_time(ts), "2024-01-15 08:05:00");
    }

    #[test]
    fn test_system_clock_is_recent() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
