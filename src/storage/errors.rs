//! Record store error types
//!
//! Error codes:
//! - TXT_IO_ERROR
//! - TXT_ENCODING_ERROR
//! - TXT_RECORD_WIDTH
//! - TXT_ROW_OUT_OF_RANGE
//! - TXT_WRITE_PAST_END
//! - TXT_DETACHED
//! - TXT_DATA_CORRUPTION (fatal)
//! - codec and schema codes are passed through

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::codec::CodecError;
use crate::schema::SchemaError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Disk I/O failure
    #[error("I/O error on {}: {message}", path.display())]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: io::Error,
    },

    /// Text still outside the storage character set after transliteration
    #[error("character {character:?} cannot be stored in {}", path.display())]
    Encoding { path: PathBuf, character: char },

    /// A raw record whose length does not match the schema
    #[error("record is {actual} bytes wide, schema requires {expected}")]
    RecordWidth { expected: usize, actual: usize },

    /// Update addressed to a row that does not exist
    #[error("row {index} out of range (table has {line_count} rows)")]
    RowOutOfRange { index: usize, line_count: usize },

    /// In-place write that would run past the end of the file
    #[error(
        "write of {len} bytes at offset {cursor} runs past the end of {} ({file_len} bytes)",
        path.display()
    )]
    WritePastEnd {
        path: PathBuf,
        cursor: u64,
        len: usize,
        file_len: u64,
    },

    /// Bound entity whose store has been dropped
    #[error("entity is bound to row {index} of a store that no longer exists")]
    Detached { index: usize },

    /// Stored bytes that are not a valid record
    #[error("corrupt record at row {row} of {}: {reason}", path.display())]
    Corrupt {
        path: PathBuf,
        row: usize,
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, message: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            message: message.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &Path, row: usize, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            path: path.to_path_buf(),
            row,
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Codec(e) => e.code(),
            StoreError::Schema(e) => e.code(),
            StoreError::Io { .. } => "TXT_IO_ERROR",
            StoreError::Encoding { .. } => "TXT_ENCODING_ERROR",
            StoreError::RecordWidth { .. } => "TXT_RECORD_WIDTH",
            StoreError::RowOutOfRange { .. } => "TXT_ROW_OUT_OF_RANGE",
            StoreError::WritePastEnd { .. } => "TXT_WRITE_PAST_END",
            StoreError::Detached { .. } => "TXT_DETACHED",
            StoreError::Corrupt { .. } => "TXT_DATA_CORRUPTION",
        }
    }

    /// Corruption means the file no longer matches its schema
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}
