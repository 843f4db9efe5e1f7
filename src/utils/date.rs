//! Timestamp formatting and serde plumbing.
//!
//! All emitted timestamps (meta tags, JSON-LD, sitemap) are ISO 8601 with
//! a numeric timezone offset, e.g. `2024-01-15T10:30:45+02:00`. Content
//! exports carry the same format.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Deserializer, Serializer, de::Error};

/// Format a timestamp as ISO 8601 with offset, second precision.
pub fn to_iso8601(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Deserialize an RFC 3339 timestamp string.
pub fn deserialize_rfc3339<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map_err(|e| D::Error::custom(format!("invalid timestamp `{s}`: {e}")))
}

/// Serialize a timestamp as RFC 3339 with offset.
pub fn serialize_rfc3339<S>(dt: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_iso8601(dt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_iso8601_with_offset() {
        let dt = DateTime::parse_from_rfc3339("2024-01-15T10:30:45+02:00").unwrap();
        assert_eq!(to_iso8601(&dt), "2024-01-15T10:30:45+02:00");
    }

    #[test]
    fn test_to_iso8601_utc_uses_numeric_offset() {
        let dt = DateTime::parse_from_rfc3339("2024-01-15T10:30:45Z").unwrap();
        assert_eq!(to_iso8601(&dt), "2024-01-15T10:30:45+00:00");
    }

    #[test]
    fn test_to_iso8601_drops_subsecond_precision() {
        let dt = DateTime::parse_from_rfc3339("2024-01-15T10:30:45.123456+00:00").unwrap();
        assert_eq!(to_iso8601(&dt), "2024-01-15T10:30:45+00:00");
    }
}
