//! Lenient readers for form-style JSON fields
//!
//! Browser forms post numbers as strings, sometimes blank. These helpers
//! accept either representation.

use serde_json::Value as JsonValue;
use std::str::FromStr;

use crate::error::AppError;

/// Read an optional number sent as a JSON number or a numeric string.
///
/// `null`, a missing field and a blank string all yield `None`.
pub fn optional_number<T: FromStr>(value: Option<&JsonValue>, field: &str) -> Result<Option<T>, AppError> {
    let invalid = || AppError::bad_request(format!("Geçersiz sayı: {}", field));

    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => n.to_string().parse().map(Some).map_err(|_| invalid()),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(JsonValue::String(s)) => s
            .trim()
            .replace(',', ".")
            .parse()
            .map(Some)
            .map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// Read an optional text field, treating a blank string as absent
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trimmed text when it is not blank
pub fn required_text(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        assert_eq!(optional_number::<i32>(Some(&json!(42)), "age").unwrap(), Some(42));
        assert_eq!(optional_number::<i32>(Some(&json!(" 42 ")), "age").unwrap(), Some(42));
        assert_eq!(optional_number::<f64>(Some(&json!("72,5")), "weight").unwrap(), Some(72.5));
        assert_eq!(optional_number::<f64>(Some(&json!(180)), "height").unwrap(), Some(180.0));
    }

    #[test]
    fn blank_and_null_mean_absent() {
        assert_eq!(optional_number::<i32>(None, "age").unwrap(), None);
        assert_eq!(optional_number::<i32>(Some(&JsonValue::Null), "age").unwrap(), None);
        assert_eq!(optional_number::<i32>(Some(&json!("  ")), "age").unwrap(), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            optional_number::<i32>(Some(&json!("otuz")), "age"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            optional_number::<i32>(Some(&json!(30.5)), "age"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            optional_number::<f64>(Some(&json!([1])), "height"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn text_helpers_trim() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" Astım ".into())), Some("Astım".to_string()));
        assert_eq!(required_text("  ali "), Some("ali"));
        assert_eq!(required_text(""), None);
    }
}
