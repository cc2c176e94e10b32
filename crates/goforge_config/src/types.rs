//! Configuration types deserialized from `goforge.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level workspace configuration parsed from `goforge.toml`.
///
/// Names the Go toolchain every build in this workspace uses: the target
/// platform, the installation root, and optional explicit paths for the
/// compiler and linker executables.
#[derive(Debug, Deserialize)]
pub struct WorkspaceConfig {
    /// The toolchain to drive.
    pub toolchain: ToolchainSection,
    /// Extra environment variables applied to every tool invocation, on top
    /// of the variables derived from the toolchain section.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// The `[toolchain]` section: target platform and tool locations.
#[derive(Debug, Deserialize)]
pub struct ToolchainSection {
    /// Target operating system (e.g. "linux", "darwin").
    pub goos: String,
    /// Target architecture (e.g. "amd64", "386", "arm").
    pub goarch: String,
    /// Root of the Go toolchain installation.
    pub goroot: String,
    /// Explicit compiler path; defaults to the per-architecture compiler
    /// under `<goroot>/bin` (`8g`, `6g`, or `5g`).
    #[serde(default)]
    pub compiler: Option<String>,
    /// Explicit linker path; defaults to the per-architecture linker under
    /// `<goroot>/bin` (`8l`, `6l`, or `5l`).
    #[serde(default)]
    pub linker: Option<String>,
}
