//! `goforge sources` — print or replace the project's source folders.

use goforge_log::BuildLog;
use goforge_project::{ProjectRef, ProjectStore};

use crate::pipeline::{render_events, resolve_project_root};
use crate::{GlobalArgs, SourcesArgs};

/// Runs the `goforge sources` command.
///
/// With `--set`, replaces the stored source folder list and confirms.
/// Without it, prints the stored folders one per line.
pub fn run(args: &SourcesArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let log = BuildLog::new();
    let mut store = ProjectStore::new(&log);
    let project = ProjectRef::from_root(&project_dir);

    if args.set.is_empty() {
        for folder in store.source_folders(&project) {
            println!("{folder}");
        }
    } else {
        store.set_source_folders(&project, args.set.clone())?;
        if !global.quiet {
            eprintln!("  Set source folders to: {}", args.set.join(", "));
        }
    }

    render_events(&log, global);
    Ok(if log.has_errors() { 1 } else { 0 })
}
