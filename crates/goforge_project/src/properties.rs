//! The persisted per-project properties record.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ProjectError;

/// The output folder used when a project has never set one.
pub const DEFAULT_OUTPUT_FOLDER: &str = "bin";

/// Location of the properties file, relative to the project root.
pub const PROPERTIES_FILE: &str = ".goforge/project.toml";

/// Build properties of one project.
///
/// Source folders are stored as a structured TOML array, so folder names
/// round-trip losslessly whatever characters they contain. The output folder
/// is optional on disk; readers fall back to [`DEFAULT_OUTPUT_FOLDER`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectProperties {
    /// Folders (relative to the project root) holding Go sources, in build
    /// order preference.
    #[serde(default)]
    pub source_folders: Vec<String>,
    /// Folder receiving compiled objects and linked executables.
    #[serde(default)]
    pub output_folder: Option<String>,
}

impl ProjectProperties {
    /// The effective output folder, defaulted when unset.
    pub fn output_folder_or_default(&self) -> &str {
        self.output_folder
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_FOLDER)
    }

    /// The properties file path for a project root.
    pub fn file_path(project_root: &Path) -> PathBuf {
        project_root.join(PROPERTIES_FILE)
    }

    /// Loads properties from a project root.
    ///
    /// Missing and malformed files are distinct errors so the caller can
    /// decide how loudly to degrade.
    pub fn load(project_root: &Path) -> Result<Self, ProjectError> {
        let path = Self::file_path(project_root);
        let content = std::fs::read_to_string(&path).map_err(|source| ProjectError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ProjectError::Malformed {
            path,
            reason: e.to_string(),
        })
    }

    /// Writes properties under a project root, creating `.goforge/` if needed.
    pub fn save(&self, project_root: &Path) -> Result<(), ProjectError> {
        let path = Self::file_path(project_root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ProjectError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ProjectError::Serialize(e.to_string()))?;
        std::fs::write(&path, content).map_err(|source| ProjectError::Io { path, source })
    }
}
