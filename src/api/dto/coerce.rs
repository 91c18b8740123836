//! Lenient field parsing for form-style clients.
//!
//! The web and mobile clients post numbers either as JSON numbers or as
//! the raw text of an input field. Missing or blank numeric fields count
//! as zero.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::TicketingError;

fn invalid(field: &str, value: &Value) -> TicketingError {
    TicketingError::InvalidRequest(format!("{field} must be a non-negative number, got {value}"))
}

/// Reads a count. Accepts `12`, `"12"`, `null`, `""` or a missing field.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidRequest`] for negative, fractional or
/// non-numeric input.
pub fn count(field: &str, value: Option<&Value>) -> Result<u32, TicketingError> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| invalid(field, &Value::Number(n.clone()))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| invalid(field, &Value::String(s.clone()))),
        Some(other) => Err(invalid(field, other)),
    }
}

/// Like [`count`], but `None` when the field is absent or blank.
///
/// # Errors
///
/// Same as [`count`].
pub fn optional_count(field: &str, value: Option<&Value>) -> Result<Option<u32>, TicketingError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        some => count(field, some).map(Some),
    }
}

/// Reads a money amount. Accepts `49.99`, `"49.99"`, `null`, `""` or a
/// missing field.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidRequest`] for non-numeric or negative
/// input.
pub fn amount(field: &str, value: Option<&Value>) -> Result<Decimal, TicketingError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(Decimal::ZERO),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(Decimal::ZERO),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string())),
        Some(Value::String(s)) => Decimal::from_str(s.trim()),
        Some(other) => return Err(invalid(field, other)),
    };
    match parsed {
        Ok(amount) if amount >= Decimal::ZERO => Ok(amount.normalize()),
        _ => Err(invalid(field, value.unwrap_or(&Value::Null))),
    }
}

/// Reads an event date. Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (taken
/// as UTC) or a bare `YYYY-MM-DD` (midnight UTC). Returns `None` for a
/// missing or blank value.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidRequest`] for any other text.
pub fn date(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, TicketingError> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| TicketingError::InvalidRequest(format!("{field} is not a valid date: {raw}")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn counts_accept_numbers_and_text() {
        assert!(matches!(count("n", Some(&json!(12))), Ok(12)));
        assert!(matches!(count("n", Some(&json!(" 7 "))), Ok(7)));
        assert!(matches!(count("n", Some(&json!(""))), Ok(0)));
        assert!(matches!(count("n", None), Ok(0)));
        assert!(count("n", Some(&json!(-1))).is_err());
        assert!(count("n", Some(&json!(1.5))).is_err());
        assert!(count("n", Some(&json!("ten"))).is_err());
        assert!(matches!(optional_count("age", Some(&json!(""))), Ok(None)));
    }

    #[test]
    fn amounts_keep_cents() {
        let Ok(price) = amount("price", Some(&json!("49.90"))) else {
            panic!("valid amount");
        };
        assert_eq!(price.to_string(), "49.9");
        let Ok(price) = amount("price", Some(&json!(120))) else {
            panic!("valid amount");
        };
        assert_eq!(price, Decimal::from(120));
        assert!(matches!(amount("price", Some(&json!(null))), Ok(p) if p.is_zero()));
        assert!(amount("price", Some(&json!("-5"))).is_err());
        assert!(amount("price", Some(&json!(true))).is_err());
    }

    #[test]
    fn dates_in_several_shapes() {
        let Ok(Some(d)) = date("date", Some("2025-06-01")) else {
            panic!("bare date should parse");
        };
        assert_eq!((d.year(), d.month(), d.day(), d.hour()), (2025, 6, 1, 0));

        let Ok(Some(d)) = date("date", Some("2025-06-01T19:30")) else {
            panic!("datetime-local should parse");
        };
        assert_eq!(d.hour(), 19);

        assert!(matches!(date("date", Some("2025-06-01T19:30:00+02:00")), Ok(Some(_))));
        assert!(matches!(date("date", Some("  ")), Ok(None)));
        assert!(date("date", Some("next friday")).is_err());
    }
}
