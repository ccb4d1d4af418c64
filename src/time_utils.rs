// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
///
/// Persisted timestamps all use this fixed-width format so Firestore
/// string range filters compare correctly.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC3339 timestamp into UTC.
pub fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_round_trip() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let formatted = format_utc_rfc3339(dt);
        assert_eq!(formatted, "2026-03-14T09:26:53Z");
        assert_eq!(parse_rfc3339(&formatted), Some(dt));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_rfc3339("not-a-date"), None);
    }
}
