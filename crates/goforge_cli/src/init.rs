//! `goforge init` — project scaffolding command.
//!
//! Creates a new goforge project directory with a `goforge.toml` config, a
//! `.goforge/project.toml` properties file, and a hello-world `src/main.go`.

use std::fs;
use std::path::PathBuf;

use goforge_project::ProjectProperties;

/// Runs the `goforge init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
/// Returns exit code 0 on success.
pub fn run(name: Option<String>) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{}' already exists", n).into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("my_project");

    eprintln!("  Creating new goforge project `{project_name}`");

    fs::create_dir_all(project_dir.join("src"))?;

    let config_path = project_dir.join("goforge.toml");
    fs::write(
        &config_path,
        format!(
            r#"[toolchain]
goos = "{goos}"
goarch = "{goarch}"
goroot = "/usr/local/go"
# compiler and linker default to <goroot>/bin per architecture

[env]
# GOPATH = "/home/you/go"
"#,
            goos = host_goos(),
            goarch = host_goarch(),
        ),
    )?;

    let properties = ProjectProperties {
        source_folders: vec!["src".to_string()],
        output_folder: None,
    };
    properties.save(&project_dir)?;

    let main_path = project_dir.join("src").join("main.go");
    fs::write(
        &main_path,
        r#"package main

import "fmt"

func main() {
	fmt.Println("hello from goforge")
}
"#,
    )?;

    eprintln!("     Created {}", config_path.display());
    eprintln!(
        "     Created {}",
        project_dir.join(".goforge/project.toml").display()
    );
    eprintln!("     Created {}", main_path.display());

    Ok(0)
}

/// The goos value matching the host platform.
fn host_goos() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "windows",
        "freebsd" => "freebsd",
        _ => "linux",
    }
}

/// The goarch value matching the host platform.
fn host_goarch() -> &'static str {
    match std::env::consts::ARCH {
        "x86" => "386",
        "arm" => "arm",
        _ => "amd64",
    }
}
