//! Observability for txtdb
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Start/complete scopes around commits
//!
//! # Usage
//!
//! ```
//! use txtdb::observability::{Event, Logger};
//!
//! Logger::info("STORE_OPENED", &[("lines", "42")]);
//! txtdb::observability::log_event_with_fields(Event::ConfigLoaded, &[("tables", "2")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

#[cfg(test)]
pub(crate) use logger::capture_logs;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

/// Log a per-action event at TRACE
pub fn trace_event(event: Event, fields: &[(&str, &str)]) {
    Logger::trace(event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(output: &str) -> Vec<serde_json::Value> {
        output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_log_event_severity_follows_failure() {
        let lines = parse(&capture_logs(|| {
            log_event(Event::StoreCreated);
            log_event(Event::CommitFailed);
        }));
        assert_eq!(lines[0]["event"], "STORE_CREATED");
        assert_eq!(lines[0]["severity"], "INFO");
        assert_eq!(lines[1]["event"], "COMMIT_FAILED");
        assert_eq!(lines[1]["severity"], "ERROR");
    }

    #[test]
    fn test_log_event_with_fields() {
        let lines = parse(&capture_logs(|| {
            log_event_with_fields(Event::ConfigLoaded, &[("path", "/tmp/txtdb.json")]);
            trace_event(Event::ActionQueued, &[("kind", "insert")]);
        }));
        assert_eq!(lines[0]["path"], "/tmp/txtdb.json");
        assert_eq!(lines[1]["event"], "ACTION_QUEUED");
        assert_eq!(lines[1]["severity"], "TRACE");
        assert_eq!(lines[1]["kind"], "insert");
    }
}
