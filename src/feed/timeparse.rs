// src/feed/timeparse.rs
//! Time normalizer for the source adapters. Epoch inputs become timezone-aware
//! UTC instants; free display text becomes naive instants. The returned type is
//! the confidence tag, so callers cannot accidentally mix the two.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::feed::types::SourceError;

/// Layouts attempted against display timestamps, in order. Ordering matters:
/// some layouts are prefixes of others, and the first full match wins.
const DISPLAY_LAYOUTS: [&str; 4] = [
    "%d %b, %Y %I:%M %p", // 15 Aug, 2024 08:00 PM
    "%d %B, %Y %I:%M %p", // 15 August, 2024 08:00 PM
    "%Y-%m-%d %H:%M:%S",
    "%d %b %Y %H:%M", // 21 Jul 2024 14:30
];

/// Epoch seconds always carry verified UTC semantics and bypass the display
/// layouts entirely.
pub fn epoch_utc(secs: i64) -> Result<DateTime<Utc>, SourceError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| SourceError::MalformedPayload(format!("epoch seconds out of range: {secs}")))
}

/// Strip label prefixes and a trailing timezone abbreviation. Abbreviations
/// are discarded, not resolved: the abbreviation-to-offset mapping is
/// ambiguous, so the result stays naive instead of being guessed into UTC.
fn strip_labels(raw: &str) -> String {
    static RE_TZ: OnceCell<Regex> = OnceCell::new();
    let re_tz = RE_TZ.get_or_init(|| Regex::new(r"\s+[A-Z]{3,}(\s*[+-]\d{2}:?\d{2})?$").unwrap());

    let s = raw
        .replace("Starts on:", "")
        .replace("Ends on:", "")
        .replace("Ended on:", "");
    re_tz.replace(s.trim(), "").trim().to_string()
}

/// Parse a display timestamp into a naive instant, trying each known layout
/// in turn. Relative phrasing ("Starts in 3 hours") has no absolute anchor
/// without the page render time and is refused rather than defaulted to now.
pub fn parse_display_time(raw: &str) -> Result<NaiveDateTime, SourceError> {
    let cleaned = strip_labels(raw);

    for layout in DISPLAY_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, layout) {
            return Ok(dt);
        }
    }

    if raw.contains("Starts in") || raw.contains("Ends in") {
        tracing::debug!(text = raw, "relative time text cannot be anchored");
    }
    Err(SourceError::UnparseableTime(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::NormalizedInstant;

    #[test]
    fn epoch_round_trips() {
        let dt = epoch_utc(1_700_000_000).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(
            NormalizedInstant::Utc(dt).epoch_seconds(),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn absurd_epoch_is_rejected() {
        assert!(epoch_utc(i64::MAX).is_err());
    }

    #[test]
    fn labeled_string_with_tz_abbreviation_parses_naive() {
        let dt = parse_display_time("Starts on: 15 Aug, 2024 08:00 PM IST").unwrap();
        assert_eq!(dt.format("%Y-%m-%dT%H:%M:%S").to_string(), "2024-08-15T20:00:00");
    }

    #[test]
    fn every_known_layout_is_accepted() {
        assert!(parse_display_time("15 August, 2024 08:00 PM").is_ok());
        assert!(parse_display_time("2024-08-15 20:00:00").is_ok());
        assert!(parse_display_time("21 Jul 2024 14:30").is_ok());
    }

    #[test]
    fn numeric_offset_after_abbreviation_is_stripped() {
        let dt = parse_display_time("15 Aug, 2024 08:00 PM IST +05:30").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "20:00");
    }

    #[test]
    fn relative_time_is_refused() {
        assert!(matches!(
            parse_display_time("Starts in 3 hours"),
            Err(SourceError::UnparseableTime(_))
        ));
    }

    #[test]
    fn unknown_shapes_are_unparseable() {
        assert!(parse_display_time("sometime next week").is_err());
        assert!(parse_display_time("").is_err());
    }
}
