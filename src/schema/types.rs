//! Schema type definitions

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use crate::codec::FieldCodec;

/// One declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Encoding rules
    #[serde(flatten)]
    pub codec: FieldCodec,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, codec: FieldCodec) -> Self {
        Self {
            name: name.into(),
            codec,
        }
    }

    pub fn width(&self) -> usize {
        self.codec.width()
    }
}

/// Validated, immutable record layout for one model.
///
/// Built through [`SchemaBuilder`](super::SchemaBuilder). The line width is
/// computed once at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    /// Model (type) name, used in entity display
    name: String,
    /// Fields in declaration order
    fields: Vec<FieldDef>,
    /// Start offset of each field within a record
    offsets: Vec<usize>,
    /// Cached `sum(width) + (n - 1)`
    total_width: usize,
}

impl RecordSchema {
    /// Validates the field list and derives the layout.
    pub(super) fn from_fields(name: String, fields: Vec<FieldDef>) -> SchemaResult<Self> {
        if fields.is_empty() {
            return Err(SchemaError::NoFields { model: name });
        }

        let mut offsets = Vec::with_capacity(fields.len());
        let mut cursor = 0;
        for (i, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName { model: name });
            }
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    model: name,
                    field: field.name.clone(),
                });
            }
            if field.width() == 0 {
                return Err(SchemaError::ZeroWidth {
                    model: name,
                    field: field.name.clone(),
                });
            }
            offsets.push(cursor);
            cursor += field.width() + 1;
        }

        // cursor counted one separator past the last field
        let total_width = cursor - 1;

        Ok(Self {
            name,
            fields,
            offsets,
            total_width,
        })
    }

    /// Returns the model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Record width: field widths plus single-space separators, no terminator
    pub fn total_width(&self) -> usize {
        self.total_width
    }

    /// Position of a field in declaration order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Looks up a field, failing with `UnknownField`
    pub fn field(&self, name: &str) -> SchemaResult<&FieldDef> {
        self.index_of(name)
            .map(|i| &self.fields[i])
            .ok_or_else(|| self.unknown_field(name))
    }

    /// Byte offset of a field within one encoded record
    pub fn field_start_offset(&self, name: &str) -> SchemaResult<usize> {
        self.index_of(name)
            .map(|i| self.offsets[i])
            .ok_or_else(|| self.unknown_field(name))
    }

    /// Byte offset of the field at position `index`
    pub fn offset_at(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Builds the `UnknownField` error for this model
    pub fn unknown_field(&self, name: &str) -> SchemaError {
        SchemaError::UnknownField {
            model: self.name.clone(),
            field: name.to_string(),
        }
    }
}
