//! Field codec definitions

use serde::{Deserialize, Serialize};

use super::errors::{CodecError, CodecResult};
use super::value::FieldValue;

/// Width of an unsigned field when none is declared (digits of 2^32-1)
pub const DEFAULT_UNSIGNED_WIDTH: usize = 10;

fn default_unsigned_width() -> usize {
    DEFAULT_UNSIGNED_WIDTH
}

/// Encoding rules for one fixed-width field.
///
/// Invariant: `encode` always yields exactly `width()` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldCodec {
    /// Free string, right-padded with spaces, truncated on overflow
    Text {
        /// Field width in bytes
        width: usize,
    },
    /// Unsigned 32-bit integer, right-aligned
    Unsigned {
        /// Field width in bytes
        #[serde(default = "default_unsigned_width")]
        width: usize,
    },
}

impl FieldCodec {
    /// Text codec of the given width
    pub fn text(width: usize) -> Self {
        FieldCodec::Text { width }
    }

    /// Unsigned codec with the default width
    pub fn unsigned() -> Self {
        FieldCodec::Unsigned {
            width: DEFAULT_UNSIGNED_WIDTH,
        }
    }

    /// Unsigned codec with an explicit width
    pub fn unsigned_with_width(width: usize) -> Self {
        FieldCodec::Unsigned { width }
    }

    /// Fixed byte count of the encoded form, excluding separators
    pub fn width(&self) -> usize {
        match self {
            FieldCodec::Text { width } | FieldCodec::Unsigned { width } => *width,
        }
    }

    /// Returns the codec name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldCodec::Text { .. } => "text",
            FieldCodec::Unsigned { .. } => "unsigned",
        }
    }

    /// The value a blank field decodes to
    pub fn empty_value(&self) -> FieldValue {
        match self {
            FieldCodec::Text { .. } => FieldValue::Text(String::new()),
            FieldCodec::Unsigned { .. } => FieldValue::Integer(0),
        }
    }

    /// Checks that `value` belongs to this codec's domain without encoding it
    pub fn check(&self, value: &FieldValue) -> CodecResult<()> {
        self.encode(value).map(|_| ())
    }

    /// Encodes a value into exactly `width()` characters
    pub fn encode(&self, value: &FieldValue) -> CodecResult<String> {
        match self {
            FieldCodec::Text { width } => match value {
                FieldValue::Text(s) => Ok(fit_text(s, *width)),
                other => Err(CodecError::TypeMismatch {
                    codec: "text",
                    actual: other.kind(),
                }),
            },
            FieldCodec::Unsigned { width } => {
                let n = match value {
                    FieldValue::Integer(n) => *n,
                    FieldValue::Text(s) => {
                        return Err(CodecError::Range {
                            value: format!("{:?}", s),
                            width: *width,
                            reason: "not an integer",
                        })
                    }
                };
                if n < 0 {
                    return Err(range_error(n, *width, "negative"));
                }
                if n > i64::from(u32::MAX) {
                    return Err(range_error(n, *width, "exceeds 2^32-1"));
                }
                let digits = n.to_string();
                if digits.len() > *width {
                    return Err(range_error(n, *width, "more digits than field width"));
                }
                Ok(format!("{:>w$}", digits, w = *width))
            }
        }
    }

    /// Decodes a stored field (padding included)
    pub fn decode(&self, text: &str) -> CodecResult<FieldValue> {
        let trimmed = text.trim();
        match self {
            FieldCodec::Text { .. } => Ok(FieldValue::Text(trimmed.to_string())),
            FieldCodec::Unsigned { .. } => {
                if trimmed.is_empty() {
                    return Ok(FieldValue::Integer(0));
                }
                trimmed
                    .parse::<u32>()
                    .map(|n| FieldValue::Integer(i64::from(n)))
                    .map_err(|_| CodecError::Format {
                        text: trimmed.to_string(),
                        expected: "unsigned integer",
                    })
            }
        }
    }
}

fn range_error(n: i64, width: usize, reason: &'static str) -> CodecError {
    CodecError::Range {
        value: n.to_string(),
        width,
        reason,
    }
}

/// Cuts `s` to its first `width` characters or right-pads it with spaces.
pub(crate) fn fit_text(s: &str, width: usize) -> String {
    let mut out: String = s.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}
