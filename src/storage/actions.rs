//! Deferred action log
//!
//! Inserts and updates are queued as closures over their already-encoded
//! values and run against the file only on commit, in enqueue order. Each
//! store owns its own log, so commits on different files never interleave.

use std::collections::VecDeque;
use std::fmt;

use super::errors::{StoreError, StoreResult};
use super::file::RecordFile;

type Apply = Box<dyn FnOnce(&mut RecordFile) -> StoreResult<()>>;

/// What a pending action will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Append one record
    Insert,
    /// Overwrite fields of an existing row
    Update { index: usize, fields: Vec<String> },
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Insert => write!(f, "insert"),
            ActionKind::Update { index, fields } => {
                write!(f, "update row {} [{}]", index, fields.join(","))
            }
        }
    }
}

/// A queued mutation
pub struct PendingAction {
    kind: ActionKind,
    apply: Apply,
}

impl PendingAction {
    pub fn new(
        kind: ActionKind,
        apply: impl FnOnce(&mut RecordFile) -> StoreResult<()> + 'static,
    ) -> Self {
        Self {
            kind,
            apply: Box::new(apply),
        }
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    fn run(self, file: &mut RecordFile) -> StoreResult<()> {
        (self.apply)(file)
    }
}

impl fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAction").field("kind", &self.kind).finish()
    }
}

/// Outcome of a failed flush
#[derive(Debug)]
pub struct FlushFailure {
    /// Actions applied before the failure
    pub applied: usize,
    /// The failing action's error
    pub error: StoreError,
}

/// Ordered queue of pending actions
#[derive(Debug, Default)]
pub struct ActionLog {
    actions: VecDeque<PendingAction>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: PendingAction) {
        self.actions.push_back(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Kinds of the queued actions, oldest first
    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.iter().map(|a| a.kind.clone()).collect()
    }

    /// Drops every queued action without running it; returns how many
    pub fn clear(&mut self) -> usize {
        let dropped = self.actions.len();
        self.actions.clear();
        dropped
    }

    /// Runs every queued action in order.
    ///
    /// On success the log is empty. On failure the actions already applied
    /// stay applied (there is no rollback), the failing action is dropped
    /// and the ones after it remain queued.
    pub fn flush(&mut self, file: &mut RecordFile) -> Result<usize, FlushFailure> {
        let mut applied = 0;
        while let Some(action) = self.actions.pop_front() {
            if let Err(error) = action.run(file) {
                return Err(FlushFailure { applied, error });
            }
            applied += 1;
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreOptions;
    use tempfile::TempDir;

    fn file(dir: &TempDir) -> RecordFile {
        RecordFile::open(&dir.path().join("t.txt"), 3, &StoreOptions::default()).unwrap()
    }

    fn append(text: &'static str) -> PendingAction {
        PendingAction::new(ActionKind::Insert, move |f| f.append_line(text))
    }

    #[test]
    fn test_flush_runs_in_order_and_clears() {
        let dir = TempDir::new().unwrap();
        let mut file = file(&dir);
        let mut log = ActionLog::new();
        log.push(append("one"));
        log.push(append("two"));

        assert_eq!(log.len(), 2);
        assert_eq!(file.line_count(), 0);

        assert_eq!(log.flush(&mut file).unwrap(), 2);
        assert!(log.is_empty());
        assert_eq!(file.read_line(1).unwrap().as_deref(), Some("one"));
        assert_eq!(file.read_line(2).unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_flush_stops_at_failure_keeping_later_actions() {
        let dir = TempDir::new().unwrap();
        let mut file = file(&dir);
        let mut log = ActionLog::new();
        log.push(append("one"));
        log.push(append("toolong"));
        log.push(append("two"));

        let failure = log.flush(&mut file).unwrap_err();
        assert_eq!(failure.applied, 1);
        assert!(matches!(failure.error, StoreError::RecordWidth { .. }));
        assert_eq!(file.line_count(), 1);
        assert_eq!(log.len(), 1);

        assert_eq!(log.flush(&mut file).unwrap(), 1);
        assert_eq!(file.read_line(2).unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_clear_discards() {
        let mut log = ActionLog::new();
        log.push(append("one"));
        assert_eq!(log.kinds(), vec![ActionKind::Insert]);
        assert_eq!(log.clear(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_kind_display() {
        let kind = ActionKind::Update {
            index: 3,
            fields: vec!["name".into(), "city".into()],
        };
        assert_eq!(kind.to_string(), "update row 3 [name,city]");
    }
}
