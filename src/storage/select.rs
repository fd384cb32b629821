//! Lazy substring scan

use super::errors::StoreResult;
use super::table::Table;
use crate::entity::Entity;

/// Iterator over the rows matching a set of substring filters.
///
/// Rows are read one at a time as the iterator advances. Matching rows come
/// back bound to their table.
#[derive(Debug)]
pub struct Select {
    table: Table,
    /// (field position, prepared needle)
    needles: Vec<(usize, String)>,
    next_row: usize,
    last_row: usize,
}

impl Select {
    pub(crate) fn new(table: Table, needles: Vec<(usize, String)>, last_row: usize) -> Self {
        Self {
            table,
            needles,
            next_row: 1,
            last_row,
        }
    }

    fn matches(&self, entity: &Entity) -> bool {
        self.needles.iter().all(|(position, needle)| {
            entity.values()[*position].to_string().contains(needle.as_str())
        })
    }
}

impl Iterator for Select {
    type Item = StoreResult<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_row <= self.last_row {
            let row = self.next_row;
            self.next_row += 1;

            match self.table.get(row) {
                Ok(Some(entity)) if self.matches(&entity) => return Some(Ok(entity)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
