//! External tool invocation with filtered, fully-drained output streams.
//!
//! This crate wraps [`std::process::Command`] for build tools that signal
//! failure through their output rather than their exit code. Each invocation
//! pumps stdout and stderr on independent worker threads; an optional
//! [`OutputFilter`] inspects a stream before the worker drains whatever is
//! left, so a subprocess can never block on a full pipe buffer. The
//! [`ToolRunner`] trait is the seam that lets higher layers substitute a
//! scripted runner in tests.

#![warn(missing_docs)]

pub mod error;
pub mod filter;
pub mod invocation;
pub mod runner;

pub use error::ProcessError;
pub use filter::{
    CollectingFilter, ErrorDetectingFilter, InputFeed, NullFilter, OutputFilter, StaticInput,
};
pub use invocation::ToolInvocation;
pub use runner::{
    is_executable, run, OwnedStreamHandlers, RunReport, StreamHandlers, SystemRunner, ToolHandle,
    ToolRunner,
};
