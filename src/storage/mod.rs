//! Fixed-width record storage engine
//!
//! Each table is a text file holding one record per line. Every record has
//! the same byte width, so row `n` is found by offset arithmetic rather than
//! by scanning for delimiters.
//!
//! # Design Principles
//!
//! - Fixed-width records, single-space field separators, two-byte terminator
//! - Writes are deferred: `insert`/`update` queue actions, `commit` applies
//! - Actions run in enqueue order against the table's own queue
//! - Values are transliterated on write and must then be ASCII
//! - No locking, no rollback: a failed commit leaves earlier actions applied

mod actions;
mod errors;
mod file;
mod layout;
mod registry;
mod select;
mod table;

pub use actions::{ActionKind, ActionLog, FlushFailure, PendingAction};
pub use errors::{StoreError, StoreResult};
pub use file::RecordFile;
pub use layout::{RecordLayout, RecordTerminator, StoreOptions};
pub use registry::StoreRegistry;
pub use select::Select;
pub use table::Table;

pub(crate) use table::TableState;
