//! Lenient field coercions for documents written by older clients, which
//! stored amounts and dates as free-form strings.

use bson::Bson;
use serde::{Deserialize, Deserializer};

/// Parses a stored amount as a decimal. Missing, null, non-numeric or
/// non-finite values count as `0.0`.
pub fn parse_amount(value: &Bson) -> f64 {
    let parsed = match value {
        Bson::Double(v) => *v,
        Bson::Int32(v) => f64::from(*v),
        Bson::Int64(v) => *v as f64,
        Bson::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// `deserialize_with` adapter around [`parse_amount`].
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Bson>::deserialize(deserializer)?;
    Ok(value.as_ref().map(parse_amount).unwrap_or(0.0))
}

/// Text of an optional field. Null and undefined mean the field is absent.
pub fn optional_text(value: &Bson) -> Option<String> {
    match value {
        Bson::Null | Bson::Undefined => None,
        other => Some(bson_text(other)),
    }
}

/// `deserialize_with` adapter for optional text fields such as `date`,
/// which older documents may hold as a BSON datetime.
pub fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Bson>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(optional_text))
}

/// Renders a text-like field. Non-string scalars keep their literal form and
/// datetimes become RFC 3339.
pub fn bson_text(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::DateTime(dt) => dt.try_to_rfc3339_string().unwrap_or_else(|_| dt.to_string()),
        Bson::Null | Bson::Undefined => String::new(),
        Bson::Int32(v) => v.to_string(),
        Bson::Int64(v) => v.to_string(),
        Bson::Double(v) => v.to_string(),
        Bson::Boolean(v) => v.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_numeric_variants() {
        assert_eq!(parse_amount(&Bson::Double(12.5)), 12.5);
        assert_eq!(parse_amount(&Bson::Int32(7)), 7.0);
        assert_eq!(parse_amount(&Bson::Int64(40)), 40.0);
    }

    #[test]
    fn test_parse_amount_strings() {
        assert_eq!(parse_amount(&Bson::String("19.99".to_string())), 19.99);
        assert_eq!(parse_amount(&Bson::String(" 3 ".to_string())), 3.0);
        assert_eq!(parse_amount(&Bson::String("ten".to_string())), 0.0);
        assert_eq!(parse_amount(&Bson::String("NaN".to_string())), 0.0);
    }

    #[test]
    fn test_parse_amount_missing_is_zero() {
        assert_eq!(parse_amount(&Bson::Null), 0.0);
        assert_eq!(parse_amount(&Bson::Boolean(true)), 0.0);
    }

    #[test]
    fn test_bson_text() {
        assert_eq!(bson_text(&Bson::String("Dhaka".to_string())), "Dhaka");
        assert_eq!(bson_text(&Bson::Int32(5)), "5");
        assert_eq!(bson_text(&Bson::Null), "");
    }

    #[test]
    fn test_optional_text_reads_datetimes() {
        let dt = bson::DateTime::parse_rfc3339_str("2025-03-06T10:00:00Z").unwrap();
        assert!(optional_text(&Bson::DateTime(dt)).unwrap().starts_with("2025-03-06T10:00:00"));
        assert_eq!(optional_text(&Bson::Null), None);
        assert_eq!(optional_text(&Bson::String("2025-03-06".to_string())).as_deref(), Some("2025-03-06"));
    }
}
