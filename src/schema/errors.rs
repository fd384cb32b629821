//! Schema error types
//!
//! Error codes:
//! - TXT_SCHEMA_ERROR (definition problems)
//! - TXT_UNKNOWN_FIELD

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while declaring or consulting a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("model {model} declares no fields")]
    NoFields { model: String },

    #[error("model {model} declares field {field} more than once")]
    DuplicateField { model: String, field: String },

    #[error("model {model} declares a field with an empty name")]
    EmptyFieldName { model: String },

    #[error("field {model}.{field} has zero width")]
    ZeroWidth { model: String, field: String },

    #[error("model {model} has no field named {field}")]
    UnknownField { model: String, field: String },

    /// A path is already bound to a different schema
    #[error("{path} is bound to model {bound}, cannot reopen it as {requested}")]
    Conflict {
        path: String,
        bound: String,
        requested: String,
    },
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownField { .. } => "TXT_UNKNOWN_FIELD",
            _ => "TXT_SCHEMA_ERROR",
        }
    }
}
