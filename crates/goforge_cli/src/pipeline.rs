//! Shared pipeline helpers for CLI commands.
//!
//! Project root resolution, Go source discovery, dep-tool ordering, and
//! build-log rendering used by `bootstrap`, `build`, `sources`, and
//! `output`.

use std::path::{Path, PathBuf};

use goforge_config::{ConfigError, WorkspaceConfig};
use goforge_log::{BuildLog, Severity, TerminalRenderer};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing
/// `goforge.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join("goforge.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find goforge.toml in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir →
/// itself). Otherwise walks up from the current directory looking for
/// `goforge.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Loads the workspace configuration, honoring `--config`.
///
/// A `--config` value naming a file is loaded as-is, whatever the file is
/// called; otherwise the configuration is read from `goforge.toml` in the
/// resolved project root.
pub fn resolve_config(
    global: &GlobalArgs,
    project_root: &Path,
) -> Result<WorkspaceConfig, ConfigError> {
    match &global.config {
        Some(path) if Path::new(path).is_file() => {
            goforge_config::load_config_file(Path::new(path))
        }
        _ => goforge_config::load_config(project_root),
    }
}

/// The per-project cache root where the dep tool is built and stamped.
pub fn cache_root(project_root: &Path) -> PathBuf {
    project_root.join(".goforge")
}

/// Lists the `.go` files directly inside one source folder, sorted by name.
///
/// One folder is one package in this build model, so discovery is not
/// recursive.
pub fn go_files_in(folder: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "go") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Returns `true` if any of the files starts with a `package main` clause.
pub fn declares_main(files: &[PathBuf]) -> bool {
    files.iter().any(|path| {
        std::fs::read_to_string(path)
            .map(|content| {
                content
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty() && !l.starts_with("//"))
                    .is_some_and(|l| l == "package main")
            })
            .unwrap_or(false)
    })
}

/// Reorders `files` to match the dep tool's output.
///
/// `order` holds one path per line as printed by the tool. Files the tool
/// did not mention keep their relative discovery order at the end, so a
/// partial or confused tool degrades instead of dropping sources.
pub fn apply_dep_order(files: &[PathBuf], order: &str) -> Vec<PathBuf> {
    let ranked: Vec<&str> = order.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let rank = |file: &PathBuf| {
        ranked
            .iter()
            .position(|line| Path::new(line) == file || file.ends_with(line))
            .unwrap_or(usize::MAX)
    };
    let mut out: Vec<PathBuf> = files.to_vec();
    out.sort_by_key(rank);
    out
}

/// Artifact base name for a source folder (`pkg/util` → `pkg_util`).
pub fn artifact_name(folder: &str) -> String {
    folder.replace(['/', '\\'], "_")
}

/// Renders accumulated build events to stderr, honoring quiet/verbose and
/// the resolved color choice.
///
/// Debug events require `--verbose`; info and warnings are hidden by
/// `--quiet`; errors always print.
pub fn render_events(log: &BuildLog, global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for event in log.take_all() {
        let show = match event.severity {
            Severity::Debug => global.verbose,
            Severity::Info | Severity::Warning => !global.quiet,
            Severity::Error => true,
        };
        if show {
            eprintln!("{}", renderer.render(&event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL_CONFIG: &str =
        "[toolchain]\ngoos = \"linux\"\ngoarch = \"amd64\"\ngoroot = \"/opt/go\"\n";

    // -- find_project_root tests --

    #[test]
    fn find_project_root_in_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("goforge.toml"), MINIMAL_CONFIG).unwrap();
        let root = find_project_root(tmp.path()).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("goforge.toml"), MINIMAL_CONFIG).unwrap();
        let sub = tmp.path().join("src");
        fs::create_dir_all(&sub).unwrap();
        let root = find_project_root(&sub).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = find_project_root(tmp.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("could not find goforge.toml"));
    }

    // -- resolve_project_root tests --

    #[test]
    fn resolve_project_root_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("goforge.toml");
        fs::write(&config_path, MINIMAL_CONFIG).unwrap();

        let global = GlobalArgs {
            quiet: false,
            verbose: false,
            color: false,
            config: Some(config_path.to_str().unwrap().to_string()),
        };
        let root = resolve_project_root(&global).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn resolve_project_root_from_config_dir() {
        let tmp = TempDir::new().unwrap();
        let global = GlobalArgs {
            quiet: false,
            verbose: false,
            color: false,
            config: Some(tmp.path().to_str().unwrap().to_string()),
        };
        let root = resolve_project_root(&global).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn custom_config_file_name_is_honored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(
            &path,
            "[toolchain]\ngoos = \"linux\"\ngoarch = \"arm\"\ngoroot = \"/opt/go\"\n",
        )
        .unwrap();

        let global = GlobalArgs {
            quiet: false,
            verbose: false,
            color: false,
            config: Some(path.to_str().unwrap().to_string()),
        };
        let root = resolve_project_root(&global).unwrap();
        assert_eq!(root, tmp.path());
        let config = resolve_config(&global, &root).unwrap();
        assert_eq!(config.toolchain.goarch, "arm");
    }

    #[test]
    fn config_dir_falls_back_to_default_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("goforge.toml"), MINIMAL_CONFIG).unwrap();
        let global = GlobalArgs {
            quiet: false,
            verbose: false,
            color: false,
            config: Some(tmp.path().to_str().unwrap().to_string()),
        };
        let config = resolve_config(&global, tmp.path()).unwrap();
        assert_eq!(config.toolchain.goos, "linux");
    }

    // -- go_files_in tests --

    #[test]
    fn go_files_are_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("zz.go"), "package a\n").unwrap();
        fs::write(tmp.path().join("aa.go"), "package a\n").unwrap();
        fs::write(tmp.path().join("notes.txt"), "not go").unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested/deep.go"), "package b\n").unwrap();

        let files = go_files_in(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["aa.go", "zz.go"]);
    }

    // -- declares_main tests --

    #[test]
    fn declares_main_detects_main_package() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib.go");
        let main = tmp.path().join("main.go");
        fs::write(&lib, "package util\n").unwrap();
        fs::write(&main, "// a command\n\npackage main\n\nfunc main() {}\n").unwrap();

        assert!(!declares_main(&[lib.clone()]));
        assert!(declares_main(&[lib, main]));
    }

    // -- apply_dep_order tests --

    #[test]
    fn dep_order_is_applied() {
        let files = vec![PathBuf::from("a.go"), PathBuf::from("b.go"), PathBuf::from("c.go")];
        let ordered = apply_dep_order(&files, "c.go\na.go\nb.go\n");
        assert_eq!(
            ordered,
            vec![PathBuf::from("c.go"), PathBuf::from("a.go"), PathBuf::from("b.go")]
        );
    }

    #[test]
    fn unmentioned_files_keep_discovery_order_at_end() {
        let files = vec![PathBuf::from("a.go"), PathBuf::from("b.go"), PathBuf::from("c.go")];
        let ordered = apply_dep_order(&files, "b.go\n");
        assert_eq!(
            ordered,
            vec![PathBuf::from("b.go"), PathBuf::from("a.go"), PathBuf::from("c.go")]
        );
    }

    #[test]
    fn empty_order_keeps_discovery_order() {
        let files = vec![PathBuf::from("a.go"), PathBuf::from("b.go")];
        assert_eq!(apply_dep_order(&files, ""), files);
    }

    // -- artifact_name tests --

    #[test]
    fn artifact_name_flattens_separators() {
        assert_eq!(artifact_name("src"), "src");
        assert_eq!(artifact_name("pkg/util"), "pkg_util");
    }
}
