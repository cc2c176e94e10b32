//! Build event logging with severity levels and a thread-safe sink.
//!
//! This crate provides structured [`LogEvent`] messages with severity levels.
//! The thread-safe [`BuildLog`] accumulates events during a build so that
//! library crates can report problems without printing or exiting; the
//! frontend decides how to render them.

#![warn(missing_docs)]

pub mod event;
pub mod render;
pub mod severity;
pub mod sink;

pub use event::LogEvent;
pub use render::TerminalRenderer;
pub use severity::Severity;
pub use sink::BuildLog;
