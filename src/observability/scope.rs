//! Start/complete logging around one operation
//!
//! - Logs the start event on creation
//! - Logs the complete event on `complete()`
//! - Logs the failure event on `fail()`
//! - Logs `{name}_INCOMPLETE` if dropped without either

use std::cell::Cell;
use std::time::Instant;

use super::events::Event;
use super::logger::Logger;

/// A scope that logs a start event and exactly one outcome event
pub struct ObservationScope {
    name: &'static str,
    completed: Cell<bool>,
    fields: Vec<(&'static str, String)>,
    timer: Timer,
}

impl ObservationScope {
    /// Opens the scope, logging `start` at INFO
    pub fn new(name: &'static str, start: Event, fields: &[(&'static str, &str)]) -> Self {
        let borrowed: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, *v)).collect();
        Logger::info(start.as_str(), &borrowed);

        Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        }
    }

    /// Logs `done` at INFO with the scope fields, any extras, and elapsed time
    pub fn complete(self, done: Event, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.timer.elapsed_ms();
        let mut all_fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all_fields.extend(extra_fields.iter().copied());
        all_fields.push(("elapsed_ms", elapsed.as_str()));
        Logger::info(done.as_str(), &all_fields);
    }

    /// Logs `failed` at ERROR with a reason
    pub fn fail(self, failed: Event, reason: &str, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        let mut all_fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all_fields.extend(extra_fields.iter().copied());
        all_fields.push(("reason", reason));
        Logger::error(failed.as_str(), &all_fields);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.completed.get() {
            let event = format!("{}_INCOMPLETE", self.name);
            Logger::warn(&event, &[("reason", "scope dropped without completion")]);
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::capture_logs;
    use serde_json::Value;

    fn parse(output: &str) -> Vec<Value> {
        output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_scope_complete() {
        let lines = parse(&capture_logs(|| {
            let scope = ObservationScope::new("COMMIT", Event::CommitBegin, &[("pending", "2")]);
            assert!(!scope.is_completed());
            scope.complete(Event::CommitComplete, &[("applied", "2")]);
        }));

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "COMMIT_BEGIN");
        assert_eq!(lines[0]["pending"], "2");
        assert_eq!(lines[1]["event"], "COMMIT_COMPLETE");
        assert_eq!(lines[1]["severity"], "INFO");
        assert_eq!(lines[1]["pending"], "2");
        assert_eq!(lines[1]["applied"], "2");
        assert!(lines[1]["elapsed_ms"].is_string());
    }

    #[test]
    fn test_scope_fail() {
        let lines = parse(&capture_logs(|| {
            let scope = ObservationScope::new("COMMIT", Event::CommitBegin, &[]);
            scope.fail(Event::CommitFailed, "disk full", &[("applied", "0")]);
        }));

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["event"], "COMMIT_FAILED");
        assert_eq!(lines[1]["severity"], "ERROR");
        assert_eq!(lines[1]["reason"], "disk full");
        assert_eq!(lines[1]["applied"], "0");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let lines = parse(&capture_logs(|| {
            let scope = ObservationScope::new("COMMIT", Event::CommitBegin, &[]);
            drop(scope);
        }));

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["event"], "COMMIT_INCOMPLETE");
        assert_eq!(lines[1]["severity"], "WARN");
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let ms: u64 = timer.elapsed_ms().parse().unwrap();
        assert!(ms >= 5);
    }
}
