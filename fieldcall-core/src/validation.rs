//! Input parsing and validation for form fields.
//!
//! Every function here runs before a store call; an error means no request
//! is issued.

use crate::constants::{MAX_CADENCE_DAYS, MIN_CADENCE_DAYS};
use crate::error::ValidationError;
use crate::identity::Timestamp;
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Format used when prefilling the timestamp field.
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Trimmed text, or `None` when blank.
pub fn optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Check a cadence length against the allowed range.
pub fn validate_cadence_days(field: &str, days: i64) -> Result<u32, ValidationError> {
    let min = i64::from(MIN_CADENCE_DAYS);
    let max = i64::from(MAX_CADENCE_DAYS);
    if days < min || days > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
            value: days,
        });
    }
    u32::try_from(days).map_err(|e| ValidationError::invalid(field, e.to_string()))
}

/// Parse a whole number of days from a text field and range-check it.
pub fn parse_cadence_days(field: &str, input: &str) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(field));
    }
    let days: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::invalid(field, format!("'{}' is not a whole number", trimmed)))?;
    validate_cadence_days(field, days)
}

/// Parse an optional visit cost.
///
/// Blank means no cost. Anything else must be a finite, non-negative number;
/// unparseable input is rejected rather than silently dropped.
pub fn parse_cost(input: &str) -> Result<Option<f64>, ValidationError> {
    let trimmed = input.trim().trim_start_matches('$').trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .replace(',', "")
        .parse()
        .map_err(|_| ValidationError::invalid("estimated_cost", format!("'{}' is not a number", input.trim())))?;
    if !value.is_finite() {
        return Err(ValidationError::invalid("estimated_cost", "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ValidationError::invalid("estimated_cost", "must not be negative"));
    }
    Ok(Some(value))
}

/// Parse a visit timestamp entered in the rep's local time.
///
/// Accepts `YYYY-MM-DDTHH:MM` (with optional seconds, `T` or space) in `tz`,
/// or a full RFC 3339 timestamp with its own offset.
pub fn parse_visit_timestamp<Tz: TimeZone>(
    input: &str,
    tz: &Tz,
) -> Result<Timestamp, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing("visit_timestamp"));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            ValidationError::invalid(
                "visit_timestamp",
                format!("'{}' is not a date and time (YYYY-MM-DDTHH:MM)", trimmed),
            )
        })?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(ts) => Ok(ts.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(ValidationError::invalid(
            "visit_timestamp",
            "time does not exist in the local timezone",
        )),
    }
}

/// Render a moment as the local text the timestamp field expects.
pub fn format_local_timestamp<Tz: TimeZone>(moment: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    moment.format(LOCAL_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use proptest::prelude::*;

    #[test]
    fn test_cadence_days_range() {
        assert_eq!(parse_cadence_days("days", "1"), Ok(1));
        assert_eq!(parse_cadence_days("days", " 365 "), Ok(365));
        assert!(matches!(
            parse_cadence_days("days", "0"),
            Err(ValidationError::OutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            parse_cadence_days("days", "366"),
            Err(ValidationError::OutOfRange { value: 366, .. })
        ));
        assert!(matches!(
            parse_cadence_days("days", "-3"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_cadence_days_rejects_text_and_blank() {
        assert!(matches!(
            parse_cadence_days("days", "weekly"),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_cadence_days("days", "  "),
            Err(ValidationError::RequiredFieldMissing { .. })
        ));
        assert!(parse_cadence_days("days", "7.5").is_err());
    }

    #[test]
    fn test_cost_parsing() {
        assert_eq!(parse_cost(""), Ok(None));
        assert_eq!(parse_cost("   "), Ok(None));
        assert_eq!(parse_cost("12.50"), Ok(Some(12.5)));
        assert_eq!(parse_cost("$1,200"), Ok(Some(1200.0)));
        assert_eq!(parse_cost("0"), Ok(Some(0.0)));
    }

    #[test]
    fn test_cost_rejects_garbage_and_negatives() {
        assert!(parse_cost("lunch").is_err());
        assert!(parse_cost("-5").is_err());
        assert!(parse_cost("NaN").is_err());
        assert!(parse_cost("inf").is_err());
    }

    #[test]
    fn test_timestamp_local_form_uses_timezone() {
        let tz = FixedOffset::west_opt(7 * 3600).expect("offset");
        let ts = parse_visit_timestamp("2026-03-10T09:30", &tz).expect("parse");
        assert_eq!(ts.to_rfc3339(), "2026-03-10T16:30:00+00:00");
    }

    #[test]
    fn test_timestamp_accepts_rfc3339_and_space_form() {
        let ts = parse_visit_timestamp("2026-03-10T09:30:00-07:00", &Utc).expect("parse");
        assert_eq!(ts.to_rfc3339(), "2026-03-10T16:30:00+00:00");
        let ts = parse_visit_timestamp("2026-03-10 09:30", &Utc).expect("parse");
        assert_eq!(ts.to_rfc3339(), "2026-03-10T09:30:00+00:00");
    }

    #[test]
    fn test_timestamp_required_and_well_formed() {
        assert!(matches!(
            parse_visit_timestamp("", &Utc),
            Err(ValidationError::RequiredFieldMissing { .. })
        ));
        assert!(matches!(
            parse_visit_timestamp("yesterday", &Utc),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_format_local_timestamp_round_trips() {
        let tz = FixedOffset::east_opt(2 * 3600).expect("offset");
        let moment = tz.with_ymd_and_hms(2026, 5, 4, 8, 15, 0).single().expect("valid");
        let text = format_local_timestamp(&moment);
        assert_eq!(text, "2026-05-04T08:15");
        let parsed = parse_visit_timestamp(&text, &tz).expect("parse");
        assert_eq!(parsed, moment.with_timezone(&Utc));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("  "), None);
        assert_eq!(optional_text(" two boxes "), Some("two boxes".to_string()));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_cadence_in_range_accepted(days in 1i64..=365) {
            prop_assert_eq!(validate_cadence_days("days", days), Ok(days as u32));
        }

        #[test]
        fn prop_cadence_out_of_range_rejected(days in prop_oneof![-1000i64..=0, 366i64..5000]) {
            prop_assert!(validate_cadence_days("days", days).is_err());
        }

        #[test]
        fn prop_non_negative_cost_accepted(cents in 0u64..10_000_000) {
            let text = format!("{}.{:02}", cents / 100, cents % 100);
            let parsed = parse_cost(&text).expect("valid cost").expect("some cost");
            prop_assert!((parsed - cents as f64 / 100.0).abs() < 1e-6);
        }
    }
}
