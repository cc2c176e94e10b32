//! goforge CLI — the command-line frontend for the goforge Go build backend.
//!
//! Provides `goforge init` for project scaffolding, `goforge bootstrap` for
//! ensuring the dependency tool is built and current, `goforge build` for
//! compiling and linking a project's source folders, and `goforge sources` /
//! `goforge output` for inspecting and setting per-project folders.

#![warn(missing_docs)]

mod bootstrap;
mod build;
mod init;
mod output;
mod pipeline;
mod sources;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// goforge — a build backend for gc-era Go projects.
#[derive(Parser, Debug)]
#[command(name = "goforge", version, about = "goforge Go build backend")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `goforge.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new goforge project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,
    },
    /// Ensure the dependency tool is built and print its path.
    Bootstrap(BootstrapArgs),
    /// Compile and link the project's source folders.
    Build(BuildArgs),
    /// Print or replace the project's source folders.
    Sources(SourcesArgs),
    /// Print or set the project's output folder.
    Output(OutputArgs),
}

/// Arguments for the `goforge bootstrap` subcommand.
#[derive(Parser, Debug)]
pub struct BootstrapArgs {
    /// Discard the in-memory tool path and re-check the disk cache.
    #[arg(long)]
    pub force: bool,

    /// Output format for the result.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `goforge build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Output format for the build report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `goforge sources` subcommand.
#[derive(Parser, Debug)]
pub struct SourcesArgs {
    /// Replace the source folder list (e.g. `--set src pkg/util`).
    #[arg(long, num_args = 1..)]
    pub set: Vec<String>,
}

/// Arguments for the `goforge output` subcommand.
#[derive(Parser, Debug)]
pub struct OutputArgs {
    /// Set the output folder.
    #[arg(long)]
    pub set: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => stderr_is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Init { name } => init::run(name),
        Command::Bootstrap(ref args) => bootstrap::run(args, &global),
        Command::Build(ref args) => build::run(args, &global),
        Command::Sources(ref args) => sources::run(args, &global),
        Command::Output(ref args) => output::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Whether stderr, where events render, is a terminal.
fn stderr_is_terminal() -> bool {
    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}
