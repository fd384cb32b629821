//! Raw record file access
//!
//! Every operation opens the file, seeks, performs one read or write and
//! closes it again. No handle is held between calls, so nothing protects
//! against another process writing the same path.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::layout::{RecordLayout, StoreOptions};
use crate::observability::{log_event_with_fields, Event};
use crate::transliterate::{first_unstorable, transliterate};

/// One table file plus the engine's view of it.
///
/// `line_count` is exact right after `open` and after each append; edits
/// made to the file by anything else are not noticed.
#[derive(Debug)]
pub struct RecordFile {
    path: PathBuf,
    layout: RecordLayout,
    line_count: usize,
    cursor: u64,
}

impl RecordFile {
    /// Opens `path`, creating it (and its parent directories when allowed)
    /// if it does not exist yet.
    pub fn open(path: &Path, line_width: usize, options: &StoreOptions) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() && options.create_dirs {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::io(parent, "failed to create parent directories", e)
                })?;
            }
        }

        let layout = RecordLayout::new(line_width, options.terminator);
        let path_str = path.display().to_string();

        if !path.exists() {
            File::create(path).map_err(|e| StoreError::io(path, "failed to create table file", e))?;
            log_event_with_fields(Event::StoreCreated, &[("path", &path_str)]);
            return Ok(Self {
                path: path.to_path_buf(),
                layout,
                line_count: 0,
                cursor: 0,
            });
        }

        let line_count = count_lines(path)?;
        let lines = line_count.to_string();
        log_event_with_fields(Event::StoreOpened, &[("lines", &lines), ("path", &path_str)]);

        Ok(Self {
            path: path.to_path_buf(),
            layout,
            line_count,
            cursor: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Moves the cursor to the start of a 1-based line and returns it
    pub fn seek_to_line(&mut self, line_number: usize) -> u64 {
        self.cursor = self.layout.seek_to_line(line_number, self.line_count);
        self.cursor
    }

    /// Moves the cursor forward by `bytes`
    pub fn advance_cursor(&mut self, bytes: usize) {
        self.cursor += bytes as u64;
    }

    /// Reads the field bytes of line `line_number`, terminator excluded.
    ///
    /// Returns `None` past the last line.
    pub fn read_line(&mut self, line_number: usize) -> StoreResult<Option<String>> {
        if line_number > self.line_count {
            return Ok(None);
        }
        let offset = self.seek_to_line(line_number);

        let mut file = File::open(&self.path)
            .map_err(|e| StoreError::io(&self.path, "failed to open table for reading", e))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| StoreError::io(&self.path, "failed to seek", e))?;

        let mut buf = Vec::with_capacity(self.layout.line_width());
        file.take(self.layout.line_width() as u64)
            .read_to_end(&mut buf)
            .map_err(|e| StoreError::io(&self.path, "failed to read record", e))?;

        // A short record ends at its newline
        if let Some(end) = buf.iter().position(|b| *b == b'\n') {
            buf.truncate(end);
        }

        String::from_utf8(buf)
            .map(Some)
            .map_err(|_| StoreError::corrupt(&self.path, line_number, "record is not valid text"))
    }

    /// Overwrites bytes at the cursor without growing the file.
    ///
    /// The text is transliterated first. Callers pass exactly one field's
    /// width; the cursor is left where it was. A write that would end past
    /// the current end of the file fails with `WritePastEnd` and leaves the
    /// file untouched.
    pub fn write_at_cursor(&mut self, text: &str) -> StoreResult<()> {
        let folded = self.fold(text)?;

        let mut file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, "failed to open table for writing", e))?;
        let file_len = file
            .metadata()
            .map_err(|e| StoreError::io(&self.path, "failed to stat table", e))?
            .len();
        if self.cursor + folded.len() as u64 > file_len {
            return Err(StoreError::WritePastEnd {
                path: self.path.clone(),
                cursor: self.cursor,
                len: folded.len(),
                file_len,
            });
        }

        file.seek(SeekFrom::Start(self.cursor))
            .map_err(|e| StoreError::io(&self.path, "failed to seek", e))?;
        file.write_all(folded.as_bytes())
            .map_err(|e| StoreError::io(&self.path, "failed to overwrite field", e))?;
        file.flush()
            .map_err(|e| StoreError::io(&self.path, "failed to flush", e))
    }

    /// Appends one record and its terminator. The only operation that grows
    /// the file.
    pub fn append_line(&mut self, text: &str) -> StoreResult<()> {
        let folded = self.fold(text)?;
        if folded.len() != self.layout.line_width() {
            return Err(StoreError::RecordWidth {
                expected: self.layout.line_width(),
                actual: folded.len(),
            });
        }

        let mut record = folded;
        record.push_str(self.layout.terminator().as_str());

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, "failed to open table for append", e))?;
        file.write_all(record.as_bytes())
            .map_err(|e| StoreError::io(&self.path, "failed to append record", e))?;
        file.flush()
            .map_err(|e| StoreError::io(&self.path, "failed to flush", e))?;

        self.line_count += 1;
        Ok(())
    }

    /// Rewrites the named spans of one row.
    ///
    /// `spans` holds `(width, value)` for every schema field in order; `None`
    /// fields are skipped but still move the cursor.
    pub fn overwrite_fields(
        &mut self,
        line_number: usize,
        spans: &[(usize, Option<String>)],
    ) -> StoreResult<()> {
        if line_number == 0 || line_number > self.line_count {
            return Err(StoreError::RowOutOfRange {
                index: line_number,
                line_count: self.line_count,
            });
        }

        self.seek_to_line(line_number);
        for (width, value) in spans {
            if let Some(text) = value {
                self.write_at_cursor(text)?;
            }
            self.advance_cursor(width + 1);
        }
        Ok(())
    }

    fn fold(&self, text: &str) -> StoreResult<String> {
        let folded = transliterate(text);
        match first_unstorable(&folded) {
            Some(character) => Err(StoreError::Encoding {
                path: self.path.clone(),
                character,
            }),
            None => Ok(folded),
        }
    }
}

/// Counts lines the way a line reader sees them: a final line without a
/// newline still counts.
fn count_lines(path: &Path) -> StoreResult<usize> {
    let file = File::open(path).map_err(|e| StoreError::io(path, "failed to open table", e))?;
    let mut count = 0;
    for segment in BufReader::new(file).split(b'\n') {
        segment.map_err(|e| StoreError::io(path, "failed to count lines", e))?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RecordTerminator;
    use tempfile::TempDir;

    const WIDTH: usize = 8;

    fn open(dir: &TempDir) -> RecordFile {
        RecordFile::open(&dir.path().join("t.txt"), WIDTH, &StoreOptions::default()).unwrap()
    }

    #[test]
    fn test_open_creates_missing_file_and_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c.txt");
        let file = RecordFile::open(&path, WIDTH, &StoreOptions::default()).unwrap();
        assert!(path.exists());
        assert_eq!(file.line_count(), 0);
    }

    #[test]
    fn test_open_without_create_dirs_fails() {
        let dir = TempDir::new().unwrap();
        let options = StoreOptions {
            create_dirs: false,
            ..StoreOptions::default()
        };
        let err = RecordFile::open(&dir.path().join("missing/t.txt"), WIDTH, &options).unwrap_err();
        assert_eq!(err.code(), "TXT_IO_ERROR");
    }

    #[test]
    fn test_open_counts_existing_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.txt");
        fs::write(&path, "aaaaaaaa \nbbbbbbbb \ncccccccc").unwrap();
        let file = RecordFile::open(&path, WIDTH, &StoreOptions::default()).unwrap();
        assert_eq!(file.line_count(), 3);
    }

    #[test]
    fn test_append_then_read() {
        let dir = TempDir::new().unwrap();
        let mut file = open(&dir);
        file.append_line("first   ").unwrap();
        file.append_line("second  ").unwrap();

        assert_eq!(file.line_count(), 2);
        assert_eq!(file.read_line(1).unwrap().as_deref(), Some("first   "));
        assert_eq!(file.read_line(2).unwrap().as_deref(), Some("second  "));
        assert_eq!(file.read_line(3).unwrap(), None);
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "first    \nsecond   \n");
    }

    #[test]
    fn test_crlf_terminator() {
        let dir = TempDir::new().unwrap();
        let options = StoreOptions {
            terminator: RecordTerminator::Crlf,
            ..StoreOptions::default()
        };
        let mut file = RecordFile::open(&dir.path().join("t.txt"), 3, &options).unwrap();
        file.append_line("abc").unwrap();
        file.append_line("def").unwrap();
        assert_eq!(file.read_line(2).unwrap().as_deref(), Some("def"));
        assert_eq!(fs::read(file.path()).unwrap(), b"abc\r\ndef\r\n");
    }

    #[test]
    fn test_append_rejects_wrong_width() {
        let dir = TempDir::new().unwrap();
        let mut file = open(&dir);
        let err = file.append_line("short").unwrap_err();
        assert!(matches!(err, StoreError::RecordWidth { expected: 8, actual: 5 }));
        assert_eq!(file.line_count(), 0);
    }

    #[test]
    fn test_append_transliterates() {
        let dir = TempDir::new().unwrap();
        let mut file = open(&dir);
        file.append_line("São Tomé").unwrap();
        assert_eq!(file.read_line(1).unwrap().as_deref(), Some("Sao Tome"));
    }

    #[test]
    fn test_append_rejects_unfoldable_characters() {
        let dir = TempDir::new().unwrap();
        let mut file = open(&dir);
        let err = file.append_line("España  ").unwrap_err();
        assert!(matches!(err, StoreError::Encoding { character: 'ñ', .. }));
        assert_eq!(fs::read(file.path()).unwrap(), b"");
    }

    #[test]
    fn test_write_at_cursor_overwrites_in_place() {
        let dir = TempDir::new().unwrap();
        let mut file = open(&dir);
        file.append_line("aaaaaaaa").unwrap();
        file.append_line("bbbbbbbb").unwrap();

        file.seek_to_line(2);
        file.advance_cursor(2);
        file.write_at_cursor("XY").unwrap();

        assert_eq!(
            fs::read_to_string(file.path()).unwrap(),
            "aaaaaaaa \nbbXYbbbb \n"
        );
        assert_eq!(file.line_count(), 2);
    }

    #[test]
    fn test_write_at_cursor_never_grows_file() {
        let dir = TempDir::new().unwrap();
        let mut file = open(&dir);

        // empty file, cursor 0
        let err = file.write_at_cursor("XY").unwrap_err();
        assert!(matches!(err, StoreError::WritePastEnd { cursor: 0, file_len: 0, .. }));
        assert_eq!(fs::read(file.path()).unwrap(), b"");

        file.append_line("aaaaaaaa").unwrap();
        file.seek_to_line(9);
        let err = file.write_at_cursor("XY").unwrap_err();
        assert_eq!(err.code(), "TXT_WRITE_PAST_END");
        assert_eq!(fs::read(file.path()).unwrap(), b"aaaaaaaa \n");
        assert_eq!(file.line_count(), 1);
    }

    #[test]
    fn test_write_at_cursor_may_end_exactly_at_eof() {
        let dir = TempDir::new().unwrap();
        let mut file = open(&dir);
        file.append_line("aaaaaaaa").unwrap();
        file.seek_to_line(1);
        file.advance_cursor(8);
        file.write_at_cursor("!\n").unwrap();
        assert_eq!(fs::read(file.path()).unwrap(), b"aaaaaaaa!\n");
    }

    #[test]
    fn test_overwrite_fields_skips_unnamed_spans() {
        let dir = TempDir::new().unwrap();
        // three fields of widths 2, 2, 2
        let mut file =
            RecordFile::open(&dir.path().join("t.txt"), 8, &StoreOptions::default()).unwrap();
        file.append_line("aa bb cc").unwrap();

        file.overwrite_fields(1, &[(2, None), (2, Some("XX".into())), (2, None)])
            .unwrap();
        assert_eq!(file.read_line(1).unwrap().as_deref(), Some("aa XX cc"));
    }

    #[test]
    fn test_overwrite_fields_checks_row_range() {
        let dir = TempDir::new().unwrap();
        let mut file = open(&dir);
        let err = file.overwrite_fields(1, &[(8, Some("x".repeat(8)))]).unwrap_err();
        assert!(matches!(err, StoreError::RowOutOfRange { index: 1, line_count: 0 }));
    }
}
