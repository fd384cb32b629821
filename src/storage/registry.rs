//! Caller-owned cache of open tables
//!
//! A registry hands out at most one [`Table`] per file path. Opening a path
//! again returns the live handle without reloading it. Separate registries
//! are fully isolated from each other.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::layout::StoreOptions;
use super::table::Table;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{RecordSchema, SchemaError};

/// Path-keyed set of open tables sharing one set of options
#[derive(Debug, Default)]
pub struct StoreRegistry {
    options: StoreOptions,
    tables: BTreeMap<PathBuf, Table>,
}

impl StoreRegistry {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            options,
            tables: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Returns the table for `path`, opening it on first use.
    ///
    /// Paths are compared after canonicalization, so `./a.txt` and `a.txt`
    /// share one table. Reopening with a different schema fails with
    /// `SchemaError::Conflict`.
    pub fn open(&mut self, path: impl AsRef<Path>, schema: RecordSchema) -> StoreResult<Table> {
        let path = path.as_ref();

        if let Ok(key) = fs::canonicalize(path) {
            if let Some(table) = self.tables.get(&key) {
                let bound = table.schema();
                if *bound != schema {
                    return Err(SchemaError::Conflict {
                        path: key.display().to_string(),
                        bound: bound.name().to_string(),
                        requested: schema.name().to_string(),
                    }
                    .into());
                }
                let key_str = key.display().to_string();
                log_event_with_fields(Event::StoreReused, &[("path", &key_str)]);
                return Ok(table.clone());
            }
        }

        let table = Table::open(path, schema, &self.options)?;
        let key = fs::canonicalize(path)
            .map_err(|e| StoreError::io(path, "failed to resolve table path", e))?;
        self.tables.insert(key, table.clone());
        Ok(table)
    }

    /// Returns the already-open table for `path`, if any
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Table> {
        let key = fs::canonicalize(path).ok()?;
        self.tables.get(&key).cloned()
    }

    /// Forgets the table for `path`. Outstanding handles keep working.
    pub fn close(&mut self, path: impl AsRef<Path>) -> Option<Table> {
        let key = fs::canonicalize(path).ok()?;
        self.tables.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Commits every table with pending actions in path order, stopping at
    /// the first failure
    pub fn commit_all(&self) -> StoreResult<usize> {
        let mut applied = 0;
        for table in self.tables.values() {
            if table.pending_actions() > 0 {
                applied += table.commit()?;
            }
        }
        Ok(applied)
    }
}
