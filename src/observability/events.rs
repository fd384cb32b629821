//! Observable store events

use std::fmt;

/// Lifecycle events emitted by the storage engine and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Store lifecycle
    /// Existing table file loaded
    StoreOpened,
    /// Table file created empty
    StoreCreated,
    /// Handle returned from a registry without reloading
    StoreReused,

    // Deferred actions
    /// Insert or update queued
    ActionQueued,
    /// Pending actions dropped without applying
    ActionsDiscarded,

    // Commit
    /// Commit begins
    CommitBegin,
    /// Every queued action applied
    CommitComplete,
    /// An action failed; earlier ones stay applied
    CommitFailed,

    // Configuration
    /// Table definitions loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreCreated => "STORE_CREATED",
            Event::StoreReused => "STORE_REUSED",
            Event::ActionQueued => "ACTION_QUEUED",
            Event::ActionsDiscarded => "ACTIONS_DISCARDED",
            Event::CommitBegin => "COMMIT_BEGIN",
            Event::CommitComplete => "COMMIT_COMPLETE",
            Event::CommitFailed => "COMMIT_FAILED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::CommitFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
