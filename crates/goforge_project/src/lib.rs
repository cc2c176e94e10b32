//! Per-project build properties: source folders and the output folder.
//!
//! Properties live in `.goforge/project.toml` under each project root. The
//! [`ProjectStore`] is an explicit cache keyed by project name with
//! get-or-load semantics and write-through setters; a missing file silently
//! yields defaults (the project simply has none yet) and a malformed one
//! degrades to defaults with a warning rather than failing the build.

#![warn(missing_docs)]

pub mod error;
pub mod properties;
pub mod store;

pub use error::ProjectError;
pub use properties::{ProjectProperties, DEFAULT_OUTPUT_FOLDER, PROPERTIES_FILE};
pub use store::{ProjectRef, ProjectStore};
