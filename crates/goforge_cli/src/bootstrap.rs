//! `goforge bootstrap` — ensure the dependency tool exists and is current.

use goforge_log::BuildLog;
use goforge_process::SystemRunner;
use goforge_toolchain::{Bootstrap, Toolchain};

use crate::pipeline::{cache_root, render_events, resolve_config, resolve_project_root};
use crate::{BootstrapArgs, GlobalArgs, ReportFormat};

/// Runs the `goforge bootstrap` command.
///
/// Resolves the project and toolchain, then asks the bootstrap for the dep
/// tool path, which builds it if missing or stale. `--force` discards the
/// in-memory path first so the disk cache is re-checked. Prints the tool
/// path on success; returns exit code 1 with diagnostics on failure.
pub fn run(args: &BootstrapArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = resolve_config(global, &project_dir)?;
    let toolchain = Toolchain::from_config(&config)?;

    let log = BuildLog::new();
    let runner = SystemRunner::new();
    let mut bootstrap = Bootstrap::new(toolchain, cache_root(&project_dir), &runner, &log);

    if args.force {
        bootstrap.invalidate();
    }

    let result = bootstrap.dep_tool().map(|p| p.to_path_buf());

    match args.format {
        ReportFormat::Json => {
            let report = serde_json::json!({
                "dep_tool": result.as_ref().ok().map(|p| p.display().to_string()),
                "phase": format!("{:?}", bootstrap.phase()),
                "events": log.take_all(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ReportFormat::Text => {
            render_events(&log, global);
            if let Ok(path) = &result {
                println!("{}", path.display());
            }
        }
    }

    match result {
        Ok(_) => Ok(0),
        Err(e) => {
            if args.format == ReportFormat::Text {
                eprintln!("error: {e}");
            }
            Ok(1)
        }
    }
}
