//! `goforge output` — print or set the project's output folder.

use goforge_log::BuildLog;
use goforge_project::{ProjectRef, ProjectStore};

use crate::pipeline::{render_events, resolve_project_root};
use crate::{GlobalArgs, OutputArgs};

/// Runs the `goforge output` command.
///
/// With `--set`, stores the output folder and confirms. Without it, prints
/// the effective output folder (defaulted when never set).
pub fn run(args: &OutputArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let log = BuildLog::new();
    let mut store = ProjectStore::new(&log);
    let project = ProjectRef::from_root(&project_dir);

    match &args.set {
        Some(folder) => {
            store.set_output_folder(&project, folder.clone())?;
            if !global.quiet {
                eprintln!("  Set output folder to: {folder}");
            }
        }
        None => println!("{}", store.output_folder(&project)),
    }

    render_events(&log, global);
    Ok(if log.has_errors() { 1 } else { 0 })
}
