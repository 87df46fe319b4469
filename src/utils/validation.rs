use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};
use std::time::Duration;
use validator::{Validate, ValidationErrors};

use crate::errors::AppError;

pub const MISSING_FIELD: &str = "missing field from request";
pub const INVALID_FIELD: &str = "invalid field in request";

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(|err| {
        let message = if is_missing_field(&err) { MISSING_FIELD } else { INVALID_FIELD };
        AppError::bad_request(message).with_error(err)
    })
}

fn is_missing_field(err: &ValidationErrors) -> bool {
    err.field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .any(|e| e.code == "required")
}

/// Unwraps a field that `validate_payload` has already checked for presence.
pub fn required<T>(field: Option<T>) -> Result<T, AppError> {
    field.ok_or_else(|| AppError::bad_request(MISSING_FIELD))
}

/// Parses an RFC 3339 timestamp, truncated to the microsecond precision of
/// a `TIMESTAMPTZ` column so the value echoed back matches the stored one.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AppError> {
    let invalid = |err: &dyn std::fmt::Display| {
        AppError::bad_request("invalid timestamp format").with_error(err)
    };
    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|err| invalid(&err))?;
    parsed
        .duration_trunc(TimeDelta::microseconds(1))
        .map_err(|err| invalid(&err))
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn duration_from_millis(millis: i64) -> Result<Duration, AppError> {
    u64::try_from(millis)
        .map(Duration::from_millis)
        .map_err(|_| AppError::bad_request(INVALID_FIELD).with_error("duration must not be negative"))
}

pub fn duration_to_millis(duration: &Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Payload {
        #[validate(required)]
        #[validate(length(min = 1))]
        name: Option<String>,
    }

    #[test]
    fn absent_field_is_reported_as_missing() {
        let err = validate_payload(&Payload { name: None }).unwrap_err();
        assert_eq!(err.message(), MISSING_FIELD);
    }

    #[test]
    fn empty_field_is_reported_as_invalid() {
        let err = validate_payload(&Payload { name: Some(String::new()) }).unwrap_err();
        assert_eq!(err.message(), INVALID_FIELD);
        assert!(validate_payload(&Payload { name: Some("Running".into()) }).is_ok());
    }

    #[test]
    fn timestamp_keeps_rfc3339_shape() {
        let parsed = parse_timestamp("2023-01-01T00:00:00Z").unwrap();
        assert_eq!(format_timestamp(&parsed), "2023-01-01T00:00:00Z");

        let offset = parse_timestamp("2023-01-01T02:00:00+02:00").unwrap();
        assert_eq!(format_timestamp(&offset), "2023-01-01T00:00:00Z");

        let precise = parse_timestamp("2023-01-01T00:00:00.123456789Z").unwrap();
        assert_eq!(format_timestamp(&precise), "2023-01-01T00:00:00.123456Z");

        let err = parse_timestamp("yesterday").unwrap_err();
        assert_eq!(err.message(), "invalid timestamp format");
    }

    #[test]
    fn duration_millis() {
        let duration = duration_from_millis(1_800_000).unwrap();
        assert_eq!(duration_to_millis(&duration), 1_800_000);
        assert!(duration_from_millis(-1).is_err());
    }
}
