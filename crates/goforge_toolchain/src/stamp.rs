//! The `version.properties` stamp that gates dep-tool reuse.
//!
//! The file format is the classic Java-properties subset the original caches
//! on disk already use: `key=value` lines, `#`/`!` comment lines, blank
//! lines ignored. The single recognized key is `depToolVersion`. Load errors
//! are explicit; callers that want the fail-safe behavior treat any of them
//! as version 0, which forces a rebuild.

use std::path::{Path, PathBuf};

/// File name of the version stamp inside the tools directory.
pub const STAMP_FILE: &str = "version.properties";

/// The recognized stamp key.
const VERSION_KEY: &str = "depToolVersion";

/// Errors from reading or writing a version stamp.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    /// The stamp file could not be read or written.
    #[error("stamp i/o error at {path}: {source}")]
    Io {
        /// The stamp file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The stamp file exists but carries no usable version.
    #[error("malformed stamp at {path}: {reason}")]
    Malformed {
        /// The stamp file path.
        path: PathBuf,
        /// What was wrong with the content.
        reason: String,
    },
}

/// The persisted record of which dep-tool build is currently cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionStamp {
    /// The recorded dep-tool version.
    pub tool_version: u32,
}

impl VersionStamp {
    /// Creates a stamp for the given version.
    pub fn new(tool_version: u32) -> Self {
        Self { tool_version }
    }

    /// Loads a stamp from `path`.
    ///
    /// Missing file, unreadable file, missing key, and non-integer value are
    /// all distinct errors here; the bootstrap degrades every one of them to
    /// version 0.
    pub fn load(path: &Path) -> Result<Self, StampError> {
        let content = std::fs::read_to_string(path).map_err(|source| StampError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if key.trim() != VERSION_KEY {
                continue;
            }
            let tool_version =
                value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| StampError::Malformed {
                        path: path.to_path_buf(),
                        reason: format!("{VERSION_KEY} is not an integer: '{}'", value.trim()),
                    })?;
            return Ok(Self { tool_version });
        }

        Err(StampError::Malformed {
            path: path.to_path_buf(),
            reason: format!("no {VERSION_KEY} entry"),
        })
    }

    /// Writes the stamp to `path`, overwriting any previous content.
    pub fn save(&self, path: &Path) -> Result<(), StampError> {
        let content = format!(
            "# automatically generated, do not change\n{VERSION_KEY}={}\n",
            self.tool_version
        );
        std::fs::write(path, content).map_err(|source| StampError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
