//! Explicit schema declaration

use super::errors::SchemaResult;
use super::types::{FieldDef, RecordSchema};
use crate::codec::FieldCodec;

/// Declares a model's fields in order.
///
/// ```
/// use txtdb::schema::SchemaBuilder;
///
/// let schema = SchemaBuilder::new("Person")
///     .unsigned("id")
///     .text("name", 10)
///     .build()
///     .unwrap();
/// assert_eq!(schema.total_width(), 21);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field with an arbitrary codec
    pub fn field(mut self, name: impl Into<String>, codec: FieldCodec) -> Self {
        self.fields.push(FieldDef::new(name, codec));
        self
    }

    /// Appends a text field
    pub fn text(self, name: impl Into<String>, width: usize) -> Self {
        self.field(name, FieldCodec::text(width))
    }

    /// Appends an unsigned field of the default width
    pub fn unsigned(self, name: impl Into<String>) -> Self {
        self.field(name, FieldCodec::unsigned())
    }

    /// Appends every field of `defs` in order
    pub fn fields(mut self, defs: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(defs);
        self
    }

    /// Validates the declaration.
    ///
    /// Fails with `SchemaError` when no fields are declared, a name is empty
    /// or repeated, or a width is zero.
    pub fn build(self) -> SchemaResult<RecordSchema> {
        RecordSchema::from_fields(self.name, self.fields)
    }
}
