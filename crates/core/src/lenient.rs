//! Forgiving field decoders for the dashboard documents
//!
//! The documents are produced by scripts that sometimes emit numbers as
//! strings, `null` for zero, or omit fields entirely. These decoders never
//! fail on such values: numbers fall back to zero (or `None`) and strings to
//! their JSON text.
//!
//! Use with `#[serde(default, deserialize_with = "lenient::f64")]`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn as_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Number, numeric string, or zero
pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(opt_f64(deserializer)?.unwrap_or(0.0))
}

/// Number or numeric string; `None` when missing or unparseable
pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_f64))
}

/// Non-negative whole count; fractions are truncated, negatives become zero
pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let n = opt_f64(deserializer)?.unwrap_or(0.0);
    Ok(if n > 0.0 { n as u64 } else { 0 })
}

/// Integer identifier given as number or string
pub fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Any scalar rendered as text; empty when missing
pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(opt_string(deserializer)?.unwrap_or_default())
}

/// Any scalar rendered as text
pub fn opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(as_string))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "super::f64")]
        secs: f64,
        #[serde(default, deserialize_with = "super::u64")]
        n: u64,
        #[serde(default, deserialize_with = "super::opt_i64")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "super::opt_string")]
        day: Option<String>,
    }

    fn row(json: &str) -> Row {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let r = row(r#"{"secs": "12.5", "n": 3, "id": "42", "day": 20251201}"#);
        assert_eq!(r.secs, 12.5);
        assert_eq!(r.n, 3);
        assert_eq!(r.id, Some(42));
        assert_eq!(r.day.as_deref(), Some("20251201"));
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let r = row(r#"{"secs": null}"#);
        assert_eq!(r.secs, 0.0);
        assert_eq!(r.n, 0);
        assert_eq!(r.id, None);
        assert_eq!(r.day, None);
    }

    #[test]
    fn test_garbage_values_do_not_fail() {
        let r = row(r#"{"secs": "abc", "n": -4, "id": [1], "day": true}"#);
        assert_eq!(r.secs, 0.0);
        assert_eq!(r.n, 0);
        assert_eq!(r.id, None);
        assert_eq!(r.day.as_deref(), Some("true"));
    }

    #[test]
    fn test_fractional_count_truncates() {
        assert_eq!(row(r#"{"n": "7.9"}"#).n, 7);
    }
}
