//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use chrono::{DateTime, Utc};

/// Validate an asset ID.
///
/// IDs are opaque to the engine, so this only rejects blank input and
/// surrounding whitespace that would never match a catalog ID.
pub fn validate_asset_id(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Asset ID cannot be empty".to_string());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(format!("Asset ID cannot contain whitespace: '{trimmed}'"));
    }
    Ok(trimmed.to_string())
}

/// Parse an RFC 3339 timestamp (e.g. `2024-05-01T12:00:00Z`).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{s}' (expected RFC 3339): {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("proj.sales.orders", "proj.sales.orders")]
    #[case("  proj.sales.orders ", "proj.sales.orders")]
    #[case("orders", "orders")]
    fn test_validate_asset_id_valid(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_asset_id(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("proj.sales orders")]
    fn test_validate_asset_id_invalid(#[case] input: &str) {
        assert!(validate_asset_id(input).is_err());
    }

    #[test]
    fn test_parse_timestamp_normalizes_offset() {
        let parsed = parse_timestamp("2024-05-01T14:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_dates() {
        let err = parse_timestamp("2024-05-01").unwrap_err();
        assert!(err.contains("RFC 3339"));
    }
}
