//! Field codecs for fixed-width records
//!
//! A codec fixes the byte width of one field and converts between a typed
//! value and its padded text form. Fixed widths are what allow a row to be
//! located by offset arithmetic instead of delimiter scanning.
//!
//! Built-in codecs:
//! - text: free string, right-padded, truncated on overflow
//! - unsigned: integer in [0, 2^32-1], left-padded, blank decodes to 0

mod errors;
mod field;
mod value;

pub use errors::{CodecError, CodecResult};
pub use field::{FieldCodec, DEFAULT_UNSIGNED_WIDTH};
pub use value::FieldValue;
