//! Table handle: the query interface over one record file
//!
//! A [`Table`] is a cheap clonable handle. Clones share one file view and
//! one pending-action log. Entities returned by `get`/`select` hold a weak
//! reference back to the table, so they never keep it alive.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::actions::{ActionKind, ActionLog, PendingAction};
use super::errors::{StoreError, StoreResult};
use super::file::RecordFile;
use super::layout::StoreOptions;
use super::select::Select;
use crate::codec::FieldValue;
use crate::entity::Entity;
use crate::observability::{trace_event, Event, ObservationScope};
use crate::schema::{RecordSchema, SchemaError};
use crate::transliterate::transliterate;

/// Shared state behind a [`Table`] handle
#[derive(Debug)]
pub(crate) struct TableState {
    schema: Rc<RecordSchema>,
    file: RecordFile,
    log: ActionLog,
}

/// Handle to one fixed-width table file
#[derive(Debug, Clone)]
pub struct Table {
    state: Rc<RefCell<TableState>>,
}

impl Table {
    /// Opens or creates the table file at `path` for `schema`.
    ///
    /// Prefer [`StoreRegistry::open`](super::StoreRegistry::open) when the
    /// same path may be opened more than once.
    pub fn open(
        path: impl AsRef<Path>,
        schema: RecordSchema,
        options: &StoreOptions,
    ) -> StoreResult<Self> {
        let file = RecordFile::open(path.as_ref(), schema.total_width(), options)?;
        Ok(Self {
            state: Rc::new(RefCell::new(TableState {
                schema: Rc::new(schema),
                file,
                log: ActionLog::new(),
            })),
        })
    }

    pub(crate) fn from_state(state: Rc<RefCell<TableState>>) -> Self {
        Self { state }
    }

    /// Returns true when both handles point at the same table
    pub fn same_table(&self, other: &Table) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub fn schema(&self) -> Rc<RecordSchema> {
        Rc::clone(&self.state.borrow().schema)
    }

    pub fn path(&self) -> PathBuf {
        self.state.borrow().file.path().to_path_buf()
    }

    /// Number of records as of the last load or append
    pub fn line_count(&self) -> usize {
        self.state.borrow().file.line_count()
    }

    // ---- raw record access (immediate, not deferred) ----

    /// Moves the cursor to a 1-based line, returning the byte offset
    pub fn seek_to_line(&self, line_number: usize) -> u64 {
        self.state.borrow_mut().file.seek_to_line(line_number)
    }

    pub fn cursor(&self) -> u64 {
        self.state.borrow().file.cursor()
    }

    /// Raw field bytes of a line, `None` past the last line
    pub fn read_line(&self, line_number: usize) -> StoreResult<Option<String>> {
        self.state.borrow_mut().file.read_line(line_number)
    }

    /// Overwrites bytes at the cursor, see [`RecordFile::write_at_cursor`]
    pub fn write_at_cursor(&self, text: &str) -> StoreResult<()> {
        self.state.borrow_mut().file.write_at_cursor(text)
    }

    /// Appends one pre-encoded record immediately
    pub fn append_line(&self, text: &str) -> StoreResult<()> {
        self.state.borrow_mut().file.append_line(text)
    }

    // ---- entities ----

    /// Builds an unbound entity for this table's schema
    pub fn new_entity<I, K, V>(&self, values: I) -> StoreResult<Entity>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        Entity::new(self.schema(), values)
    }

    /// Reads row `index` (1-based) as an entity bound to this table.
    ///
    /// Returns `None` for 0 and for rows past the end.
    pub fn get(&self, index: usize) -> StoreResult<Option<Entity>> {
        if index == 0 {
            return Ok(None);
        }

        let mut state = self.state.borrow_mut();
        let line = match state.file.read_line(index)? {
            Some(line) => line,
            None => return Ok(None),
        };
        let values = decode_record(&state.schema, &line, index, state.file.path())?;
        let schema = Rc::clone(&state.schema);
        drop(state);

        Ok(Some(Entity::bound(
            schema,
            values,
            Rc::downgrade(&self.state),
            index,
        )))
    }

    /// Queues an append of `entity`. Nothing is written until `commit`.
    pub fn insert(&self, entity: &Entity) -> StoreResult<()> {
        let mut state = self.state.borrow_mut();
        if *entity.schema() != state.schema {
            return Err(SchemaError::Conflict {
                path: state.file.path().display().to_string(),
                bound: state.schema.name().to_string(),
                requested: entity.type_name().to_string(),
            }
            .into());
        }

        let encoded = state
            .schema
            .fields()
            .iter()
            .zip(entity.values())
            .map(|(field, value)| field.codec.encode(value))
            .collect::<Result<Vec<_>, _>>()?;
        let line = encoded.join(" ");

        trace_event(Event::ActionQueued, &[("kind", "insert")]);
        state.log.push(PendingAction::new(ActionKind::Insert, move |file| {
            file.append_line(&line)
        }));
        Ok(())
    }

    /// Queues an overwrite of the named fields of row `index`.
    ///
    /// Values are validated and encoded now; the row range is checked when
    /// the action runs, so rows inserted earlier in the same batch can be
    /// updated.
    pub fn update<I, K, V>(&self, index: usize, values: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut state = self.state.borrow_mut();
        if index == 0 {
            return Err(StoreError::RowOutOfRange {
                index,
                line_count: state.file.line_count(),
            });
        }

        let schema = Rc::clone(&state.schema);
        let mut spans: Vec<(usize, Option<String>)> =
            schema.fields().iter().map(|f| (f.width(), None)).collect();
        let mut names = Vec::new();

        for (name, value) in values {
            let name = name.as_ref();
            let position = schema.index_of(name).ok_or_else(|| schema.unknown_field(name))?;
            let encoded = schema.fields()[position].codec.encode(&value.into())?;
            spans[position].1 = Some(encoded);
            names.push(name.to_string());
        }

        let index_str = index.to_string();
        trace_event(Event::ActionQueued, &[("kind", "update"), ("row", &index_str)]);
        state.log.push(PendingAction::new(
            ActionKind::Update {
                index,
                fields: names,
            },
            move |file| file.overwrite_fields(index, &spans),
        ));
        Ok(())
    }

    /// Lazily scans every row, yielding those whose fields contain the
    /// given needles.
    ///
    /// Each needle is cut to its field's width and transliterated, then
    /// matched as a substring of the field's decoded form. No filters
    /// yields every row. The row range is fixed when `select` is called.
    pub fn select<I, K, N>(&self, filters: I) -> StoreResult<Select>
    where
        I: IntoIterator<Item = (K, N)>,
        K: AsRef<str>,
        N: AsRef<str>,
    {
        let schema = self.schema();
        let mut needles = Vec::new();
        for (name, needle) in filters {
            let name = name.as_ref();
            let position = schema.index_of(name).ok_or_else(|| schema.unknown_field(name))?;
            let width = schema.fields()[position].width();
            let cut: String = needle.as_ref().chars().take(width).collect();
            needles.push((position, transliterate(&cut)));
        }

        Ok(Select::new(self.clone(), needles, self.line_count()))
    }

    /// Applies every pending action in enqueue order.
    ///
    /// Returns how many actions ran. A failing action aborts the commit:
    /// earlier actions stay applied and later ones stay queued.
    pub fn commit(&self) -> StoreResult<usize> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let path = state.file.path().display().to_string();
        let pending = state.log.len().to_string();
        let scope = ObservationScope::new(
            "COMMIT",
            Event::CommitBegin,
            &[("path", &path), ("pending", &pending)],
        );

        match state.log.flush(&mut state.file) {
            Ok(applied) => {
                let applied_str = applied.to_string();
                scope.complete(Event::CommitComplete, &[("applied", &applied_str)]);
                Ok(applied)
            }
            Err(failure) => {
                let applied_str = failure.applied.to_string();
                scope.fail(
                    Event::CommitFailed,
                    &failure.error.to_string(),
                    &[("applied", &applied_str)],
                );
                Err(failure.error)
            }
        }
    }

    /// Number of queued actions
    pub fn pending_actions(&self) -> usize {
        self.state.borrow().log.len()
    }

    /// Queued action kinds, oldest first
    pub fn pending(&self) -> Vec<ActionKind> {
        self.state.borrow().log.kinds()
    }

    /// Drops all queued actions without applying them
    pub fn discard_pending(&self) -> usize {
        let dropped = self.state.borrow_mut().log.clear();
        let dropped_str = dropped.to_string();
        crate::observability::log_event_with_fields(
            Event::ActionsDiscarded,
            &[("dropped", &dropped_str)],
        );
        dropped
    }
}

/// Splits a raw record at the schema offsets and decodes every field.
///
/// Each slice covers the field plus its trailing separator; a record cut
/// short yields blank fields.
fn decode_record(
    schema: &RecordSchema,
    line: &str,
    row: usize,
    path: &Path,
) -> StoreResult<Vec<FieldValue>> {
    let mut values = Vec::with_capacity(schema.field_count());
    for (position, field) in schema.fields().iter().enumerate() {
        let start = schema.offset_at(position).unwrap_or(line.len()).min(line.len());
        let end = (start + field.width() + 1).min(line.len());
        let raw = line
            .get(start..end)
            .ok_or_else(|| StoreError::corrupt(path, row, "field boundary splits a character"))?;
        values.push(field.codec.decode(raw)?);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;
    use tempfile::TempDir;

    fn people(dir: &TempDir) -> Table {
        let schema = SchemaBuilder::new("Person")
            .unsigned("id")
            .text("name", 10)
            .build()
            .unwrap();
        Table::open(dir.path().join("people.txt"), schema, &StoreOptions::default()).unwrap()
    }

    #[test]
    fn test_insert_commit_get() {
        let dir = TempDir::new().unwrap();
        let table = people(&dir);
        let ana = table.new_entity([("id", FieldValue::from(1)), ("name", "Ana".into())]).unwrap();

        table.insert(&ana).unwrap();
        assert_eq!(table.line_count(), 0);
        assert_eq!(table.commit().unwrap(), 1);

        let row = table.get(1).unwrap().unwrap();
        assert_eq!(row.get("id"), Some(&FieldValue::Integer(1)));
        assert_eq!(row.get("name"), Some(&FieldValue::from("Ana")));
        assert_eq!(row.row_index(), Some(1));
    }

    #[test]
    fn test_get_out_of_range() {
        let dir = TempDir::new().unwrap();
        let table = people(&dir);
        assert!(table.get(0).unwrap().is_none());
        assert!(table.get(1).unwrap().is_none());
    }

    #[test]
    fn test_update_unknown_field_fails_synchronously() {
        let dir = TempDir::new().unwrap();
        let table = people(&dir);
        let err = table.update(1, [("age", 3)]).unwrap_err();
        assert_eq!(err.code(), "TXT_UNKNOWN_FIELD");
        assert_eq!(table.pending_actions(), 0);
    }

    #[test]
    fn test_update_range_error_fails_synchronously() {
        let dir = TempDir::new().unwrap();
        let table = people(&dir);
        let err = table.update(1, [("id", -5)]).unwrap_err();
        assert_eq!(err.code(), "TXT_RANGE_ERROR");
    }

    #[test]
    fn test_update_missing_row_fails_at_commit() {
        let dir = TempDir::new().unwrap();
        let table = people(&dir);
        table.update(4, [("name", "Bia")]).unwrap();
        let err = table.commit().unwrap_err();
        assert!(matches!(err, StoreError::RowOutOfRange { index: 4, .. }));
        assert_eq!(table.pending_actions(), 0);
    }

    #[test]
    fn test_insert_rejects_foreign_schema() {
        let dir = TempDir::new().unwrap();
        let table = people(&dir);
        let other = Rc::new(SchemaBuilder::new("Tag").text("label", 4).build().unwrap());
        let tag = Entity::new(other, [("label", "x")]).unwrap();
        let err = table.insert(&tag).unwrap_err();
        assert!(matches!(err, StoreError::Schema(SchemaError::Conflict { .. })));
    }

    #[test]
    fn test_decode_record_reports_bad_integer() {
        let dir = TempDir::new().unwrap();
        let table = people(&dir);
        table.append_line("      12x3 Ana       ").unwrap();
        let err = table.get(1).unwrap_err();
        assert_eq!(err.code(), "TXT_FORMAT_ERROR");
    }

    #[test]
    fn test_discard_pending() {
        let dir = TempDir::new().unwrap();
        let table = people(&dir);
        table.update(1, [("name", "x")]).unwrap();
        assert_eq!(table.discard_pending(), 1);
        assert_eq!(table.commit().unwrap(), 0);
    }
}
