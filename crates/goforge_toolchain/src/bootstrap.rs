//! The dependency-tool bootstrap: first-run detection, compile, link, stamp.
//!
//! The dep tool is a small Go program shipped with goforge that computes the
//! compilation order of a project's sources. It cannot exist before a
//! toolchain does, so it is compiled from the bundled source on first use
//! and cached per (OS, architecture) under the cache root, gated by a
//! [`VersionStamp`]. The lifecycle is an explicit state machine
//! ([`BootstrapPhase`] + [`advance`]) and the fast-path decision is a pure
//! function ([`stamp_verdict`]), so both are testable without spawning a
//! process; [`Bootstrap`] drives them through an injected
//! [`ToolRunner`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use goforge_log::BuildLog;
use goforge_process::{
    ErrorDetectingFilter, ProcessError, StreamHandlers, ToolInvocation, ToolRunner,
};

use crate::stamp::{VersionStamp, STAMP_FILE};
use crate::toolchain::Toolchain;

/// The version of the bundled dep tool. Bump when `tools/dep.go` changes;
/// every cached copy with an older stamp is rebuilt on next use.
pub const DEP_TOOL_VERSION: u32 = 1;

/// Base name of the dep tool executable and its source file.
const DEP_TOOL_NAME: &str = "dep";

/// The bundled dep tool source, extracted to the tools directory before
/// every rebuild.
const DEP_SOURCE: &str = include_str!("../tools/dep.go");

/// Kill timeout for compile and link invocations, so a wedged toolchain
/// cannot hang a build forever.
const TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// Which build stage a failure occurred in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStage {
    /// The compile invocation.
    Compile,
    /// The link invocation.
    Link,
}

/// Lifecycle states of one bootstrap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapPhase {
    /// No check has run yet (also the state every new attempt restarts from).
    Unchecked,
    /// A current executable is cached and trusted.
    Valid,
    /// The cache was found missing or outdated; a rebuild is pending.
    Stale,
    /// The compile invocation is running.
    Compiling,
    /// The link invocation is running.
    Linking,
    /// The attempt failed in the given stage; nothing is cached.
    Failed(BuildStage),
}

/// Events that move the bootstrap between phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapEvent {
    /// The stamp matched and the executable exists.
    CachedToolOk,
    /// The stamp or the executable was missing or outdated.
    CacheStale,
    /// Source was extracted and the compiler was invoked.
    CompileStarted,
    /// The compile produced no error evidence.
    CompileOk,
    /// The compile produced error evidence or failed to launch.
    CompileFailed,
    /// The link produced no error evidence.
    LinkOk,
    /// The link produced error evidence or failed to launch.
    LinkFailed,
}

/// The pure phase-transition function.
///
/// Events that make no sense in the current phase leave it unchanged, so the
/// driver cannot corrupt the state by replaying.
pub fn advance(phase: BootstrapPhase, event: BootstrapEvent) -> BootstrapPhase {
    use BootstrapEvent as E;
    use BootstrapPhase as P;
    match (phase, event) {
        (P::Unchecked, E::CachedToolOk) => P::Valid,
        (P::Unchecked, E::CacheStale) => P::Stale,
        (P::Stale, E::CompileStarted) => P::Compiling,
        (P::Compiling, E::CompileOk) => P::Linking,
        (P::Compiling, E::CompileFailed) => P::Failed(BuildStage::Compile),
        (P::Linking, E::LinkOk) => P::Valid,
        (P::Linking, E::LinkFailed) => P::Failed(BuildStage::Link),
        (phase, _) => phase,
    }
}

/// The fast-path decision for a cached executable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StampVerdict {
    /// The cached executable is trusted; no rebuild.
    Reuse,
    /// The cache must be rebuilt.
    Rebuild,
}

/// Decides whether a cached executable can be reused.
///
/// Reuse requires both the recorded version to equal the expected one and
/// the executable to exist; any mismatch forces a rebuild.
pub fn stamp_verdict(recorded: u32, expected: u32, exe_exists: bool) -> StampVerdict {
    if recorded == expected && exe_exists {
        StampVerdict::Reuse
    } else {
        StampVerdict::Rebuild
    }
}

/// Errors from a bootstrap attempt.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The compiler reported errors; the link was not attempted.
    #[error("dep tool compile failed:\n{}", lines.join("\n"))]
    CompileFailed {
        /// Diagnostic lines captured from the compiler.
        lines: Vec<String>,
    },

    /// The linker reported errors.
    #[error("dep tool link failed:\n{}", lines.join("\n"))]
    LinkFailed {
        /// Diagnostic lines captured from the linker.
        lines: Vec<String>,
    },

    /// A tool could not be invoked at all.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A filesystem operation on the cache failed.
    #[error("cache i/o error at {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// The long-lived dep-tool cache for one toolchain.
///
/// Owns the in-memory tool path; a path cached here is trusted for the rest
/// of the process's lifetime unless [`invalidate`](Self::invalidate) is
/// called. A failed attempt caches nothing, so the next request retries the
/// whole sequence.
pub struct Bootstrap<'a> {
    toolchain: Toolchain,
    cache_root: PathBuf,
    runner: &'a dyn ToolRunner,
    log: &'a BuildLog,
    dep_tool: Option<PathBuf>,
    phase: BootstrapPhase,
}

impl<'a> Bootstrap<'a> {
    /// Creates a bootstrap for `toolchain`, caching under `cache_root`.
    pub fn new(
        toolchain: Toolchain,
        cache_root: impl Into<PathBuf>,
        runner: &'a dyn ToolRunner,
        log: &'a BuildLog,
    ) -> Self {
        Self {
            toolchain,
            cache_root: cache_root.into(),
            runner,
            log,
            dep_tool: None,
            phase: BootstrapPhase::Unchecked,
        }
    }

    /// The per-target tools directory: `<cache-root>/<os>/<arch>/tools`.
    pub fn tools_dir(&self) -> PathBuf {
        self.cache_root.join(self.toolchain.target.cache_subpath())
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> BootstrapPhase {
        self.phase
    }

    /// Returns the dep tool path, building it first if necessary.
    ///
    /// The fast path — in-memory cache, or a current stamp plus an existing
    /// executable — invokes no tools. Otherwise the stale executable is
    /// removed, the bundled source is extracted, and the tool is compiled
    /// and linked; the stamp is rewritten only after a successful link.
    pub fn dep_tool(&mut self) -> Result<&Path, BootstrapError> {
        let path = match self.dep_tool.take() {
            Some(path) => path,
            None => self.ensure_tool()?,
        };
        Ok(self.dep_tool.insert(path).as_path())
    }

    /// Drops the in-memory path so the next request re-checks the disk cache.
    pub fn invalidate(&mut self) {
        self.dep_tool = None;
        self.phase = BootstrapPhase::Unchecked;
    }

    /// Runs the full check/rebuild sequence.
    fn ensure_tool(&mut self) -> Result<PathBuf, BootstrapError> {
        self.phase = BootstrapPhase::Unchecked;

        let tools_dir = self.tools_dir();
        std::fs::create_dir_all(&tools_dir).map_err(|source| BootstrapError::Io {
            path: tools_dir.clone(),
            source,
        })?;

        let exe_path = tools_dir.join(self.toolchain.executable_name(DEP_TOOL_NAME));
        let stamp_path = tools_dir.join(STAMP_FILE);

        // Any stamp problem degrades to version 0, which forces a rebuild.
        let recorded = match VersionStamp::load(&stamp_path) {
            Ok(stamp) => stamp.tool_version,
            Err(e) => {
                self.log.debug(format!("no usable version stamp: {e}"));
                0
            }
        };

        if stamp_verdict(recorded, DEP_TOOL_VERSION, exe_path.exists()) == StampVerdict::Reuse {
            self.phase = advance(self.phase, BootstrapEvent::CachedToolOk);
            self.log
                .debug(format!("cached dep tool is current: {}", exe_path.display()));
            return Ok(exe_path);
        }

        self.phase = advance(self.phase, BootstrapEvent::CacheStale);
        self.log.info(format!(
            "rebuilding dep tool for {} (recorded version {recorded}, expected {DEP_TOOL_VERSION})",
            self.toolchain.target
        ));

        if exe_path.exists() {
            std::fs::remove_file(&exe_path).map_err(|source| BootstrapError::Io {
                path: exe_path.clone(),
                source,
            })?;
        }

        let source_name = format!("{DEP_TOOL_NAME}.go");
        let source_path = tools_dir.join(&source_name);
        std::fs::write(&source_path, DEP_SOURCE).map_err(|source| BootstrapError::Io {
            path: source_path.clone(),
            source,
        })?;

        let object_name = format!("{DEP_TOOL_NAME}{}", self.toolchain.target.arch.object_ext());
        let exe_name = self.toolchain.executable_name(DEP_TOOL_NAME);

        // Compile. Error evidence is whatever the compiler prints, on either
        // stream; the exit code is not consulted.
        self.phase = advance(self.phase, BootstrapEvent::CompileStarted);
        let detector = ErrorDetectingFilter::new();
        let compile = ToolInvocation::new(&self.toolchain.compiler)
            .args(["-o", &object_name, &source_name])
            .cwd(&tools_dir)
            .envs(self.toolchain.invocation_env())
            .timeout(TOOL_TIMEOUT);
        if let Err(e) = self.run_filtered(&compile, &detector) {
            self.phase = advance(self.phase, BootstrapEvent::CompileFailed);
            return Err(e.into());
        }
        if detector.saw_error() {
            self.phase = advance(self.phase, BootstrapEvent::CompileFailed);
            let lines = detector.lines();
            for line in &lines {
                self.log.error(format!("dep compile: {line}"));
            }
            return Err(BootstrapError::CompileFailed { lines });
        }
        self.phase = advance(self.phase, BootstrapEvent::CompileOk);

        // Link, only reached with a clean compile.
        let detector = ErrorDetectingFilter::new();
        let link = ToolInvocation::new(&self.toolchain.linker)
            .args(["-o", &exe_name, &object_name])
            .cwd(&tools_dir)
            .envs(self.toolchain.invocation_env())
            .timeout(TOOL_TIMEOUT);
        if let Err(e) = self.run_filtered(&link, &detector) {
            self.phase = advance(self.phase, BootstrapEvent::LinkFailed);
            return Err(e.into());
        }
        if detector.saw_error() {
            self.phase = advance(self.phase, BootstrapEvent::LinkFailed);
            let lines = detector.lines();
            for line in &lines {
                self.log.error(format!("dep link: {line}"));
            }
            return Err(BootstrapError::LinkFailed { lines });
        }

        // A stamp-write failure is degraded: the freshly built tool is still
        // good for this process's lifetime, only the next start rebuilds.
        if let Err(e) = VersionStamp::new(DEP_TOOL_VERSION).save(&stamp_path) {
            self.log
                .warning(format!("failed to write version stamp: {e}"));
        }

        self.phase = advance(self.phase, BootstrapEvent::LinkOk);
        self.log
            .info(format!("dep tool built: {}", exe_path.display()));
        Ok(exe_path)
    }

    /// Runs one invocation with clones of `detector` on both output streams.
    fn run_filtered(
        &self,
        invocation: &ToolInvocation,
        detector: &ErrorDetectingFilter,
    ) -> Result<(), ProcessError> {
        self.log
            .debug(format!("running {}", invocation.display_command()));
        let mut on_stdout = detector.clone();
        let mut on_stderr = detector.clone();
        let handlers = StreamHandlers::none()
            .stdout(&mut on_stdout)
            .stderr(&mut on_stderr);
        self.runner.run(invocation, handlers)?;
        Ok(())
    }
}
