//! Record schemas
//!
//! A schema is the ordered list of fields that makes up one record, each with
//! its codec. It is declared once through [`SchemaBuilder`], validated at
//! `build()`, and immutable afterwards.
//!
//! # Layout
//!
//! - Fields appear in declaration order
//! - Adjacent fields are separated by a single space
//! - `total_width = sum(width) + (field_count - 1)`, terminator excluded

mod builder;
mod errors;
mod types;

pub use builder::SchemaBuilder;
pub use errors::{SchemaError, SchemaResult};
pub use types::{FieldDef, RecordSchema};
