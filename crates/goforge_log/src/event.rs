//! Structured build events with severity and message.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A single build event reported by a library crate.
///
/// Events are the primary mechanism for surfacing problems and progress to
/// the user. Library code emits events into a [`BuildLog`](crate::BuildLog)
/// instead of printing, so the frontend controls rendering and verbosity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// The severity level of this event.
    pub severity: Severity,
    /// The human-readable message.
    pub message: String,
}

impl LogEvent {
    /// Creates a new event with the given severity and message.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Creates an error-severity event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Creates a warning-severity event.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Creates an info-severity event.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Creates a debug-severity event.
    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_severity() {
        assert_eq!(LogEvent::error("boom").severity, Severity::Error);
        assert_eq!(LogEvent::warning("hmm").severity, Severity::Warning);
        assert_eq!(LogEvent::info("ok").severity, Severity::Info);
        assert_eq!(LogEvent::debug("trace").severity, Severity::Debug);
    }

    #[test]
    fn message_preserved() {
        let event = LogEvent::error("compiler not found at /opt/go/bin/6g");
        assert_eq!(event.message, "compiler not found at /opt/go/bin/6g");
    }

    #[test]
    fn serializes_to_json() {
        let event = LogEvent::warning("stale tool removed");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"Warning\""));
        assert!(json.contains("stale tool removed"));
        let back: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
