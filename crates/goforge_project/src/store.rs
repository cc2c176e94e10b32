//! The keyed project-properties cache with write-through persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use goforge_log::BuildLog;

use crate::error::ProjectError;
use crate::properties::ProjectProperties;

/// A resolved project identity: its name and root directory.
///
/// Supplied by the frontend; this crate never inspects anything above the
/// root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectRef {
    /// The project name, used as the cache key.
    pub name: String,
    /// The project root directory.
    pub root: PathBuf,
}

impl ProjectRef {
    /// Creates a project reference.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    /// A reference whose name is the root directory's file name.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        Self { name, root }
    }
}

/// An explicit cache of per-project properties, keyed by project name.
///
/// Properties load lazily on first access and stay cached for the store's
/// lifetime unless invalidated. Setters mutate memory first and then write
/// through to disk synchronously; a write failure is surfaced while memory
/// keeps the new value, leaving the disk copy stale until the next write.
pub struct ProjectStore<'a> {
    cache: HashMap<String, ProjectProperties>,
    log: &'a BuildLog,
}

impl<'a> ProjectStore<'a> {
    /// Creates an empty store.
    pub fn new(log: &'a BuildLog) -> Self {
        Self {
            cache: HashMap::new(),
            log,
        }
    }

    /// Returns the properties for a project, loading on first access.
    ///
    /// A missing file silently yields defaults (the project simply has no
    /// properties yet); a malformed one yields defaults with a warning.
    pub fn get_or_load(&mut self, project: &ProjectRef) -> &ProjectProperties {
        self.entry(project)
    }

    /// The project's source folders, in stored order.
    pub fn source_folders(&mut self, project: &ProjectRef) -> Vec<String> {
        self.entry(project).source_folders.clone()
    }

    /// The project's output folder, defaulted when unset.
    pub fn output_folder(&mut self, project: &ProjectRef) -> String {
        self.entry(project).output_folder_or_default().to_string()
    }

    /// Replaces the source folders and writes through to disk.
    pub fn set_source_folders(
        &mut self,
        project: &ProjectRef,
        folders: Vec<String>,
    ) -> Result<(), ProjectError> {
        let root = project.root.clone();
        let props = self.entry_mut(project);
        props.source_folders = folders;
        let snapshot = props.clone();
        snapshot.save(&root)
    }

    /// Sets the output folder and writes through to disk.
    pub fn set_output_folder(
        &mut self,
        project: &ProjectRef,
        folder: impl Into<String>,
    ) -> Result<(), ProjectError> {
        let root = project.root.clone();
        let props = self.entry_mut(project);
        props.output_folder = Some(folder.into());
        let snapshot = props.clone();
        snapshot.save(&root)
    }

    /// Drops the cached entry so the next access reloads from disk.
    pub fn invalidate(&mut self, project_name: &str) {
        self.cache.remove(project_name);
    }

    fn entry(&mut self, project: &ProjectRef) -> &ProjectProperties {
        self.entry_mut(project)
    }

    fn entry_mut(&mut self, project: &ProjectRef) -> &mut ProjectProperties {
        let log = self.log;
        self.cache
            .entry(project.name.clone())
            .or_insert_with(|| load_degraded(&project.root, log))
    }
}

/// Loads properties, degrading any failure to defaults.
fn load_degraded(root: &Path, log: &BuildLog) -> ProjectProperties {
    match ProjectProperties::load(root) {
        Ok(props) => props,
        Err(ProjectError::Io { .. }) => ProjectProperties::default(),
        Err(e) => {
            log.warning(format!("ignoring unreadable project properties: {e}"));
            ProjectProperties::default()
        }
    }
}
