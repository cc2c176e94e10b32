//! Parsing and validation of `goforge.toml` workspace configuration files.
//!
//! This crate reads the workspace configuration file and produces a
//! strongly-typed [`WorkspaceConfig`] naming the Go toolchain to drive:
//! target platform, toolchain root, and optional compiler/linker overrides.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str};
pub use types::{ToolchainSection, WorkspaceConfig};
