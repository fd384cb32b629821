//! txtdb - typed tables over fixed-width text files
//!
//! Each table is a plain text file holding one record per line. Every
//! record of a table has the same width, so rows are addressed by offset
//! arithmetic and can be overwritten in place.
//!
//! ```no_run
//! use txtdb::schema::SchemaBuilder;
//! use txtdb::storage::StoreRegistry;
//! use txtdb::FieldValue;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = SchemaBuilder::new("Person").unsigned("id").text("name", 10).build()?;
//! let mut registry = StoreRegistry::default();
//! let people = registry.open("people.txt", schema)?;
//!
//! let ana = people.new_entity([("id", FieldValue::from(1)), ("name", "Ana".into())])?;
//! people.insert(&ana)?;
//! people.commit()?;
//!
//! let mut row = people.get(1)?.expect("row 1 was just written");
//! row.set("name", "Bia")?;
//! people.commit()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod entity;
pub mod observability;
pub mod schema;
pub mod storage;
pub mod transliterate;

pub use codec::{FieldCodec, FieldValue};
pub use entity::Entity;
pub use schema::{RecordSchema, SchemaBuilder};
pub use storage::{StoreError, StoreOptions, StoreRegistry, Table};
