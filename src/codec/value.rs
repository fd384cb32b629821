//! Typed field values

use std::fmt;

use serde::{Deserialize, Serialize};

/// A decoded (or caller-supplied) field value.
///
/// Integers are carried as `i64` so that out-of-domain values supplied by a
/// caller survive until the codec rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text
    Text(String),
    /// Integer
    Integer(i64),
}

impl FieldValue {
    /// Returns the kind name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Returns the integer as `u32` when it lies in the unsigned domain
    pub fn as_u32(&self) -> Option<u32> {
        self.as_integer().and_then(|n| u32::try_from(n).ok())
    }

    /// Representation used in entity display: text is double-quoted,
    /// integers are bare.
    pub fn repr(&self) -> String {
        match self {
            FieldValue::Text(s) => format!("\"{}\"", s),
            FieldValue::Integer(n) => n.to_string(),
        }
    }
}

/// Decoded string form, the form substring filters match against
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repr_quotes_text_only() {
        assert_eq!(FieldValue::from("Ana").repr(), "\"Ana\"");
        assert_eq!(FieldValue::from(42u32).repr(), "42");
    }

    #[test]
    fn test_display_is_decoded_form() {
        assert_eq!(FieldValue::from("Ana").to_string(), "Ana");
        assert_eq!(FieldValue::from(7).to_string(), "7");
    }

    #[test]
    fn test_accessors_match_variant() {
        let text = FieldValue::from("Ana");
        assert_eq!(text.as_text(), Some("Ana"));
        assert_eq!(text.as_integer(), None);
        assert_eq!(text.kind(), "text");

        let number = FieldValue::from(7);
        assert_eq!(number.as_text(), None);
        assert_eq!(number.as_integer(), Some(7));
        assert_eq!(number.kind(), "integer");
    }

    #[test]
    fn test_as_u32_domain() {
        assert_eq!(FieldValue::from(5).as_u32(), Some(5));
        assert_eq!(FieldValue::from(-1).as_u32(), None);
        assert_eq!(FieldValue::Integer(1 << 32).as_u32(), None);
        assert_eq!(FieldValue::from("5").as_u32(), None);
    }
}
