//! Codec error types
//!
//! Error codes:
//! - TXT_RANGE_ERROR
//! - TXT_FORMAT_ERROR
//! - TXT_TYPE_MISMATCH

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding a single field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Value outside the codec's domain
    #[error("value {value} out of range for unsigned field (width {width}): {reason}")]
    Range {
        value: String,
        width: usize,
        reason: &'static str,
    },

    /// Stored text that cannot be parsed as the field type
    #[error("cannot decode {text:?} as {expected}")]
    Format { text: String, expected: &'static str },

    /// Value of the wrong kind handed to a codec
    #[error("{codec} field cannot hold {actual} value")]
    TypeMismatch {
        codec: &'static str,
        actual: &'static str,
    },
}

impl CodecError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Range { .. } => "TXT_RANGE_ERROR",
            CodecError::Format { .. } => "TXT_FORMAT_ERROR",
            CodecError::TypeMismatch { .. } => "TXT_TYPE_MISMATCH",
        }
    }
}
