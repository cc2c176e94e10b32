//! Error types for project property persistence.

use std::path::PathBuf;

/// Errors from loading or saving a project's properties file.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// The properties file could not be read or written.
    #[error("properties i/o error at {path}: {source}")]
    Io {
        /// The properties file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The properties file exists but is not valid TOML.
    #[error("malformed properties at {path}: {reason}")]
    Malformed {
        /// The properties file path.
        path: PathBuf,
        /// The parse failure.
        reason: String,
    },

    /// The in-memory properties could not be serialized.
    #[error("failed to serialize properties: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io() {
        let err = ProjectError::Io {
            path: PathBuf::from("/p/.goforge/project.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("project.toml"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn display_malformed() {
        let err = ProjectError::Malformed {
            path: PathBuf::from("p.toml"),
            reason: "expected '='".to_string(),
        };
        assert!(format!("{err}").contains("malformed properties"));
    }
}
