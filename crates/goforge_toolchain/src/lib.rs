//! Go toolchain conventions and the self-healing dependency-tool cache.
//!
//! The gc-era Go toolchain ships one compiler and linker per architecture
//! (`8g`/`6g`/`5g` and `8l`/`6l`/`5l`) with matching object-file extensions.
//! This crate captures those conventions in [`Target`], resolves a usable
//! [`Toolchain`] from workspace configuration, and maintains the versioned
//! on-disk cache of the bundled dependency-ordering tool via [`Bootstrap`]:
//! built from source on first use, reused while its version stamp matches,
//! rebuilt when missing or stale.

#![warn(missing_docs)]

pub mod bootstrap;
pub mod stamp;
pub mod target;
pub mod toolchain;

pub use bootstrap::{
    advance, stamp_verdict, Bootstrap, BootstrapError, BootstrapEvent, BootstrapPhase, BuildStage,
    StampVerdict, DEP_TOOL_VERSION,
};
pub use stamp::{StampError, VersionStamp, STAMP_FILE};
pub use target::{Target, TargetArch, TargetOs};
pub use toolchain::Toolchain;
