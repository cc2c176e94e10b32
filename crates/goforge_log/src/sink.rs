//! Thread-safe event accumulator shared across build stages.

use crate::event::LogEvent;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A thread-safe accumulator for events emitted during a build.
///
/// Multiple threads can emit events concurrently via [`emit`](Self::emit).
/// The error count is tracked atomically for fast `has_errors` checks without
/// locking the event vector.
pub struct BuildLog {
    events: Mutex<Vec<LogEvent>>,
    error_count: AtomicUsize,
}

impl BuildLog {
    /// Creates a new empty build log.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Emits an event into the log.
    ///
    /// If the event has [`Severity::Error`], the error count is incremented atomically.
    pub fn emit(&self, event: LogEvent) {
        if event.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        let mut events = self.events.lock().unwrap();
        events.push(event);
    }

    /// Emits an error-severity event.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogEvent::error(message));
    }

    /// Emits a warning-severity event.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(LogEvent::warning(message));
    }

    /// Emits an info-severity event.
    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogEvent::info(message));
    }

    /// Emits a debug-severity event.
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogEvent::debug(message));
    }

    /// Returns `true` if any error-severity events have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity events emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Takes all accumulated events, leaving the log empty.
    pub fn take_all(&self) -> Vec<LogEvent> {
        let mut events = self.events.lock().unwrap();
        std::mem::take(&mut *events)
    }

    /// Returns a snapshot of all accumulated events without draining.
    pub fn events(&self) -> Vec<LogEvent> {
        let events = self.events.lock().unwrap();
        events.clone()
    }
}

impl Default for BuildLog {
    fn default() -> Self {
        Self::new()
    }
}
