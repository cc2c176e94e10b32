//! `goforge build` — compile and link the project's source folders.
//!
//! Orchestrates the full build:
//! 1. Resolve project root, configuration, and per-project properties
//! 2. Ensure the dep tool via the bootstrap
//! 3. Ask the dep tool for the compilation order of all Go sources
//! 4. Compile each source folder to an object file in the output folder
//! 5. Link folders that declare `package main` into executables

use std::path::{Path, PathBuf};

use goforge_log::BuildLog;
use goforge_process::{
    CollectingFilter, ErrorDetectingFilter, StreamHandlers, SystemRunner, ToolInvocation,
    ToolRunner,
};
use goforge_project::{ProjectRef, ProjectStore};
use goforge_toolchain::{Bootstrap, Toolchain};

use crate::pipeline::{
    apply_dep_order, artifact_name, cache_root, declares_main, go_files_in, render_events,
    resolve_config, resolve_project_root,
};
use crate::{BuildArgs, GlobalArgs, ReportFormat};

/// One source folder with its discovered files, in compile order.
struct Package {
    folder: String,
    files: Vec<PathBuf>,
    is_main: bool,
}

/// Runs the `goforge build` command.
///
/// Returns exit code 0 when every compile and link step produced no error
/// evidence, 1 otherwise.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    // Step 1: Find project root and load config
    let project_dir = resolve_project_root(global)?;
    let config = resolve_config(global, &project_dir)?;
    let toolchain = Toolchain::from_config(&config)?;

    if !global.quiet {
        eprintln!(
            "  Building {} for {}",
            project_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| project_dir.display().to_string()),
            toolchain.target
        );
    }

    let log = BuildLog::new();

    // Step 2: Project properties
    let mut store = ProjectStore::new(&log);
    let project = ProjectRef::from_root(&project_dir);
    let mut folders = store.source_folders(&project);
    if folders.is_empty() {
        folders.push("src".to_string());
    }
    let out_dir = project_dir.join(store.output_folder(&project));
    std::fs::create_dir_all(&out_dir)?;

    // Step 3: Ensure the dep tool
    let runner = SystemRunner::new();
    let mut bootstrap = Bootstrap::new(
        toolchain.clone(),
        cache_root(&project_dir),
        &runner,
        &log,
    );
    let dep_tool = match bootstrap.dep_tool() {
        Ok(path) => path.to_path_buf(),
        Err(e) => {
            log.error(format!("cannot build dependency tool: {e}"));
            report(&log, args, global)?;
            return Ok(1);
        }
    };

    // Step 4: Discover sources per folder
    let mut packages = Vec::new();
    for folder in &folders {
        let dir = project_dir.join(folder);
        if !dir.is_dir() {
            log.warning(format!("source folder '{folder}' does not exist, skipping"));
            continue;
        }
        let files = go_files_in(&dir)?;
        if files.is_empty() {
            log.debug(format!("source folder '{folder}' has no Go files"));
            continue;
        }
        let is_main = declares_main(&files);
        packages.push(Package {
            folder: folder.clone(),
            files,
            is_main,
        });
    }
    if packages.is_empty() {
        eprintln!("error: no Go source files found in {}", project_dir.display());
        return Ok(1);
    }

    // Step 5: Compilation order from the dep tool. Any failure here
    // degrades to the folder's discovery order; it never aborts the build.
    order_packages(&dep_tool, &project_dir, &toolchain, &runner, &mut packages, &log);

    // Step 6: Compile each package, Step 7: link the mains
    for package in &packages {
        if !compile_package(&toolchain, &runner, &project_dir, &out_dir, package, &log) {
            continue;
        }
        if !global.quiet {
            eprintln!("  Compiled {}", package.folder);
        }
        if package.is_main {
            if link_package(&toolchain, &runner, &project_dir, &out_dir, package, &log)
                && !global.quiet
            {
                eprintln!("    Linked {}", binary_path(&toolchain, &out_dir, package).display());
            }
        }
    }

    report(&log, args, global)?;
    if log.has_errors() {
        Ok(1)
    } else {
        if !global.quiet {
            eprintln!("  Build complete.");
        }
        Ok(0)
    }
}

/// Asks the dep tool for a global compile order and applies it per package.
fn order_packages(
    dep_tool: &Path,
    project_dir: &Path,
    toolchain: &Toolchain,
    runner: &dyn ToolRunner,
    packages: &mut [Package],
    log: &BuildLog,
) {
    let mut rel_files = Vec::new();
    for package in packages.iter() {
        for file in &package.files {
            rel_files.push(relative_to(file, project_dir));
        }
    }

    let collector = CollectingFilter::new();
    let detector = ErrorDetectingFilter::new();
    let mut on_stdout = collector.clone();
    let mut on_stderr = detector.clone();
    let invocation = ToolInvocation::new(dep_tool)
        .args(rel_files)
        .cwd(project_dir)
        .envs(toolchain.invocation_env());
    let handlers = StreamHandlers::none()
        .stdout(&mut on_stdout)
        .stderr(&mut on_stderr);

    if let Err(e) = runner.run(&invocation, handlers) {
        log.warning(format!(
            "dep tool failed to run ({e}); building in folder order"
        ));
        return;
    }
    if detector.saw_error() {
        for line in detector.lines() {
            log.warning(format!("dep: {line}"));
        }
        log.warning("dep tool reported problems; building in folder order".to_string());
        return;
    }

    let order = collector.text();
    for package in packages.iter_mut() {
        package.files = apply_dep_order(&package.files, &order);
    }
}

/// Compiles one package; returns `true` when no error evidence was seen.
fn compile_package(
    toolchain: &Toolchain,
    runner: &dyn ToolRunner,
    project_dir: &Path,
    out_dir: &Path,
    package: &Package,
    log: &BuildLog,
) -> bool {
    let object = object_path(toolchain, out_dir, package);
    let mut invocation_args = vec![
        "-o".to_string(),
        relative_to(&object, project_dir),
    ];
    for file in &package.files {
        invocation_args.push(relative_to(file, project_dir));
    }
    let invocation = ToolInvocation::new(&toolchain.compiler)
        .args(invocation_args)
        .cwd(project_dir)
        .envs(toolchain.invocation_env());

    run_checked(runner, &invocation, log, &format!("compile {}", package.folder))
}

/// Links one main package; returns `true` when no error evidence was seen.
fn link_package(
    toolchain: &Toolchain,
    runner: &dyn ToolRunner,
    project_dir: &Path,
    out_dir: &Path,
    package: &Package,
    log: &BuildLog,
) -> bool {
    let object = object_path(toolchain, out_dir, package);
    let binary = binary_path(toolchain, out_dir, package);
    let invocation = ToolInvocation::new(&toolchain.linker)
        .args([
            "-o".to_string(),
            relative_to(&binary, project_dir),
            relative_to(&object, project_dir),
        ])
        .cwd(project_dir)
        .envs(toolchain.invocation_env());

    run_checked(runner, &invocation, log, &format!("link {}", package.folder))
}

/// Runs one tool invocation with an error detector on both streams.
///
/// Launch failures and error evidence both land in the log as errors; the
/// exit code is never consulted.
fn run_checked(
    runner: &dyn ToolRunner,
    invocation: &ToolInvocation,
    log: &BuildLog,
    stage: &str,
) -> bool {
    let detector = ErrorDetectingFilter::new();
    let mut on_stdout = detector.clone();
    let mut on_stderr = detector.clone();
    let handlers = StreamHandlers::none()
        .stdout(&mut on_stdout)
        .stderr(&mut on_stderr);
    if let Err(e) = runner.run(invocation, handlers) {
        log.error(format!("{stage}: {e}"));
        return false;
    }
    if detector.saw_error() {
        for line in detector.lines() {
            log.error(format!("{stage}: {line}"));
        }
        return false;
    }
    true
}

/// The object file a package compiles to.
fn object_path(toolchain: &Toolchain, out_dir: &Path, package: &Package) -> PathBuf {
    out_dir.join(format!(
        "{}{}",
        artifact_name(&package.folder),
        toolchain.target.arch.object_ext()
    ))
}

/// The executable a main package links to.
fn binary_path(toolchain: &Toolchain, out_dir: &Path, package: &Package) -> PathBuf {
    out_dir.join(toolchain.executable_name(&artifact_name(&package.folder)))
}

/// A path rendered relative to the project root when possible.
fn relative_to(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Renders the build report in the requested format.
fn report(log: &BuildLog, args: &BuildArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.format {
        ReportFormat::Json => {
            let report = serde_json::json!({
                "success": !log.has_errors(),
                "errors": log.error_count(),
                "events": log.take_all(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ReportFormat::Text => render_events(log, global),
    }
    Ok(())
}
