//! Byte layout of a table file
//!
//! Every record is `line_width` bytes of fields followed by a two-byte
//! terminator, so row `n` (1-based) starts at `(n - 1) * (line_width + 2)`.

use serde::{Deserialize, Serialize};

/// Two-byte sequence closing every record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTerminator {
    /// Trailing separator then newline: `" \n"`
    #[default]
    SpaceNewline,
    /// Carriage return then newline: `"\r\n"`
    Crlf,
}

impl RecordTerminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordTerminator::SpaceNewline => " \n",
            RecordTerminator::Crlf => "\r\n",
        }
    }

    /// Always 2
    pub fn byte_len(&self) -> usize {
        self.as_str().len()
    }
}

/// Options applied when a table file is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Record terminator written by appends
    pub terminator: RecordTerminator,
    /// Create missing parent directories on open
    pub create_dirs: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            terminator: RecordTerminator::default(),
            create_dirs: true,
        }
    }
}

/// Offset arithmetic for one schema width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    line_width: usize,
    terminator: RecordTerminator,
}

impl RecordLayout {
    pub fn new(line_width: usize, terminator: RecordTerminator) -> Self {
        Self {
            line_width,
            terminator,
        }
    }

    /// Field bytes per record, terminator excluded
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    pub fn terminator(&self) -> RecordTerminator {
        self.terminator
    }

    /// Distance between the starts of two consecutive records
    pub fn stride(&self) -> u64 {
        (self.line_width + self.terminator.byte_len()) as u64
    }

    /// Maps a 1-based line number to a byte cursor.
    ///
    /// Lines 0 and 1 both map to the start of the file. A line past
    /// `line_count` maps to the sentinel `stride * line_count + 1`, which is
    /// never read from: every reader checks the row range first.
    pub fn seek_to_line(&self, line_number: usize, line_count: usize) -> u64 {
        if line_number <= 1 {
            return 0;
        }
        if line_number > line_count {
            return self.stride() * line_count as u64 + 1;
        }
        (line_number as u64 - 1) * self.stride()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> RecordLayout {
        // {id: unsigned(10), name: text(10)}
        RecordLayout::new(21, RecordTerminator::SpaceNewline)
    }

    #[test]
    fn test_terminators_are_two_bytes() {
        assert_eq!(RecordTerminator::SpaceNewline.byte_len(), 2);
        assert_eq!(RecordTerminator::Crlf.byte_len(), 2);
    }

    #[test]
    fn test_first_lines_map_to_zero() {
        assert_eq!(layout().seek_to_line(0, 5), 0);
        assert_eq!(layout().seek_to_line(1, 5), 0);
        assert_eq!(layout().seek_to_line(1, 0), 0);
    }

    #[test]
    fn test_in_range_lines_use_stride() {
        let layout = layout();
        assert_eq!(layout.stride(), 23);
        assert_eq!(layout.seek_to_line(2, 5), 23);
        assert_eq!(layout.seek_to_line(5, 5), 92);
    }

    #[test]
    fn test_past_end_sentinel() {
        assert_eq!(layout().seek_to_line(9, 3), 23 * 3 + 1);
    }

    #[test]
    fn test_terminator_serde_names() {
        let t: RecordTerminator = serde_json::from_str("\"crlf\"").unwrap();
        assert_eq!(t, RecordTerminator::Crlf);
        let t: RecordTerminator = serde_json::from_str("\"space_newline\"").unwrap();
        assert_eq!(t, RecordTerminator::SpaceNewline);
    }
}
