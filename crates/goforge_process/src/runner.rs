//! Blocking and detached execution of external tools.
//!
//! One OS process per call. Stdout and stderr are pumped on their own worker
//! threads so a chatty tool can never fill a pipe buffer and deadlock; an
//! optional stdin worker feeds input concurrently. The blocking entry point
//! uses scoped threads, so it returns only after both streams are fully
//! drained. Exit status is carried in the [`RunReport`] for information but
//! is never treated as failure here: the tools this crate targets report
//! failure through their output, which is the filters' job to observe.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ProcessError;
use crate::filter::{InputFeed, OutputFilter};
use crate::invocation::ToolInvocation;

/// Poll interval for the child-exit watchdog.
const WAIT_POLL: Duration = Duration::from_millis(10);

/// Borrowed per-call stream handlers for a blocking run.
///
/// All fields are optional; an absent filter means the runner's drain alone
/// consumes that stream.
#[derive(Default)]
pub struct StreamHandlers<'a> {
    /// Filter for the child's stdout.
    pub stdout: Option<&'a mut dyn OutputFilter>,
    /// Filter for the child's stderr.
    pub stderr: Option<&'a mut dyn OutputFilter>,
    /// Feed for the child's stdin; the pipe is closed when it returns.
    pub stdin: Option<&'a mut dyn InputFeed>,
}

impl<'a> StreamHandlers<'a> {
    /// Handlers that attach nothing; streams are drained and discarded.
    pub fn none() -> Self {
        Self::default()
    }

    /// Attaches a stdout filter.
    pub fn stdout(mut self, filter: &'a mut dyn OutputFilter) -> Self {
        self.stdout = Some(filter);
        self
    }

    /// Attaches a stderr filter.
    pub fn stderr(mut self, filter: &'a mut dyn OutputFilter) -> Self {
        self.stderr = Some(filter);
        self
    }

    /// Attaches a stdin feed.
    pub fn stdin(mut self, feed: &'a mut dyn InputFeed) -> Self {
        self.stdin = Some(feed);
        self
    }
}

/// Owned stream handlers for a detached run; they move into the workers.
#[derive(Default)]
pub struct OwnedStreamHandlers {
    /// Filter for the child's stdout.
    pub stdout: Option<Box<dyn OutputFilter + Send>>,
    /// Filter for the child's stderr.
    pub stderr: Option<Box<dyn OutputFilter + Send>>,
    /// Feed for the child's stdin.
    pub stdin: Option<Box<dyn InputFeed + Send>>,
}

impl OwnedStreamHandlers {
    /// Handlers that attach nothing.
    pub fn none() -> Self {
        Self::default()
    }
}

/// The outcome of one completed invocation.
///
/// Produced only when the invocation machinery itself succeeded; whether the
/// tool succeeded is for the caller to decide from filter evidence.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// The child's exit code, or `None` if it was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Total bytes consumed from the child's stdout.
    pub stdout_bytes: u64,
    /// Total bytes consumed from the child's stderr.
    pub stderr_bytes: u64,
    /// Non-fatal problems observed by filters or the stdin feed. A filter
    /// that fails mid-stream lands here; the stream was still drained.
    pub notes: Vec<String>,
    /// Wall-clock time from spawn to full drain.
    pub elapsed: Duration,
}

impl RunReport {
    /// Returns `true` if the child exited with code zero.
    pub fn exited_cleanly(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// The seam between tool-invoking code and the operating system.
///
/// Production code uses [`SystemRunner`]; tests drive orchestration logic
/// with a scripted implementation that feeds canned output into the filters.
pub trait ToolRunner {
    /// Runs the invocation to completion, blocking until both output streams
    /// are fully drained.
    fn run(
        &self,
        invocation: &ToolInvocation,
        handlers: StreamHandlers<'_>,
    ) -> Result<RunReport, ProcessError>;
}

/// The production [`ToolRunner`] backed by [`std::process::Command`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Creates a runner.
    pub fn new() -> Self {
        Self
    }

    /// Launches the invocation without blocking the caller.
    ///
    /// The returned handle can be joined for the report, or dropped, in
    /// which case a detached supervisor still drains the streams and reaps
    /// the child but the caller has no completion signal.
    pub fn spawn(
        &self,
        invocation: &ToolInvocation,
        mut handlers: OwnedStreamHandlers,
    ) -> Result<ToolHandle, ProcessError> {
        let program = invocation.program.display().to_string();
        // Spawn on the caller's thread so launch failures surface here.
        let child = launch(invocation, handlers.stdin.is_some())?;
        let invocation = invocation.clone();
        let thread = thread::Builder::new()
            .name(format!("goforge-run {program}"))
            .spawn(move || {
                supervise(
                    child,
                    &invocation,
                    handlers
                        .stdout
                        .as_mut()
                        .map(|f| f.as_mut() as &mut dyn OutputFilter),
                    handlers
                        .stderr
                        .as_mut()
                        .map(|f| f.as_mut() as &mut dyn OutputFilter),
                    handlers
                        .stdin
                        .as_mut()
                        .map(|f| f.as_mut() as &mut dyn InputFeed),
                )
            })
            .map_err(|source| ProcessError::Launch {
                program: program.clone(),
                source,
            })?;
        Ok(ToolHandle { program, thread })
    }
}

impl ToolRunner for SystemRunner {
    fn run(
        &self,
        invocation: &ToolInvocation,
        handlers: StreamHandlers<'_>,
    ) -> Result<RunReport, ProcessError> {
        let child = launch(invocation, handlers.stdin.is_some())?;
        supervise(
            child,
            invocation,
            handlers.stdout,
            handlers.stderr,
            handlers.stdin,
        )
    }
}

/// A handle to a detached invocation started by [`SystemRunner::spawn`].
pub struct ToolHandle {
    program: String,
    thread: thread::JoinHandle<Result<RunReport, ProcessError>>,
}

impl ToolHandle {
    /// Blocks until the invocation completes and returns its report.
    pub fn join(self) -> Result<RunReport, ProcessError> {
        self.thread
            .join()
            .map_err(|_| ProcessError::WorkerPanic {
                program: self.program,
            })?
    }

    /// Returns `true` once the supervisor has finished (the report is ready).
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Abandons the invocation. The supervisor keeps draining and reaps the
    /// child; its report is discarded.
    pub fn detach(self) {}
}

/// Builds and spawns the OS process for an invocation.
fn launch(invocation: &ToolInvocation, pipe_stdin: bool) -> Result<Child, ProcessError> {
    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if pipe_stdin {
            Stdio::piped()
        } else {
            Stdio::null()
        });
    // The child leads its own process group so a timeout kill reaches any
    // descendants that inherited the pipe write ends.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    if let Some(dir) = invocation.effective_cwd() {
        command.current_dir(dir);
    }
    for (key, value) in &invocation.env {
        command.env(key, value);
    }
    command.spawn().map_err(|source| ProcessError::Launch {
        program: invocation.program.display().to_string(),
        source,
    })
}

/// Pumps the streams of a spawned child and waits for its exit.
///
/// Shared between the blocking and detached entry points. Returns only after
/// both output workers have finished, i.e. both pipes hit EOF.
fn supervise(
    mut child: Child,
    invocation: &ToolInvocation,
    stdout_filter: Option<&mut dyn OutputFilter>,
    stderr_filter: Option<&mut dyn OutputFilter>,
    stdin_feed: Option<&mut dyn InputFeed>,
) -> Result<RunReport, ProcessError> {
    let program = invocation.program.display().to_string();
    let started = Instant::now();

    let stdout_pipe = child.stdout.take().ok_or(ProcessError::StreamCapture {
        program: program.clone(),
        stream: "stdout",
    })?;
    let stderr_pipe = child.stderr.take().ok_or(ProcessError::StreamCapture {
        program: program.clone(),
        stream: "stderr",
    })?;
    let stdin_pipe = child.stdin.take();

    let mut timed_out = false;
    let (stdout_res, stderr_res, stdin_note) = thread::scope(|scope| {
        let out_worker = scope.spawn(move || pump(stdout_pipe, stdout_filter));
        let err_worker = scope.spawn(move || pump(stderr_pipe, stderr_filter));
        let in_worker = stdin_feed.zip(stdin_pipe).map(|(feed, mut pipe)| {
            scope.spawn(move || {
                let result = feed.feed(&mut pipe);
                drop(pipe); // deliver EOF
                result.err().map(|e| format!("stdin feed: {e}"))
            })
        });

        // The caller thread doubles as the exit watchdog. Killing the
        // child's whole process tree on timeout closes every copy of the
        // pipe write ends, which unblocks the pump workers.
        let deadline = invocation.timeout.map(|t| started + t);
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {}
                Err(_) => break, // wait() below reports the error
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    kill_tree(&mut child);
                    timed_out = true;
                    break;
                }
            }
            thread::sleep(WAIT_POLL);
        }

        let stdout_res = out_worker.join();
        let stderr_res = err_worker.join();
        let stdin_note = in_worker.and_then(|w| w.join().ok()).flatten();
        (stdout_res, stderr_res, stdin_note)
    });

    let status = child.wait().map_err(|source| ProcessError::Wait {
        program: program.clone(),
        source,
    })?;

    if timed_out {
        return Err(ProcessError::TimedOut {
            program,
            timeout: invocation.timeout.unwrap_or_default(),
        });
    }

    let (stdout_bytes, stdout_note) = finish_pump(&program, "stdout", stdout_res)?;
    let (stderr_bytes, stderr_note) = finish_pump(&program, "stderr", stderr_res)?;

    let mut notes = Vec::new();
    notes.extend(stdout_note);
    notes.extend(stderr_note);
    notes.extend(stdin_note);

    Ok(RunReport {
        exit_code: status.code(),
        stdout_bytes,
        stderr_bytes,
        notes,
        elapsed: started.elapsed(),
    })
}

/// Kills the child and, on unix, its entire process group.
///
/// The plain `Child::kill` reaches only the direct child; a wrapper script
/// or forking tool leaves grandchildren holding the pipes, which would keep
/// the pumps blocked until the grandchildren exit on their own.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    unsafe {
        libc::kill(-(child.id() as libc::pid_t), libc::SIGKILL);
    }
    let _ = child.kill();
}

/// Resolves a pump worker's join result into byte count and optional note.
fn finish_pump(
    program: &str,
    stream: &'static str,
    joined: thread::Result<PumpOutcome>,
) -> Result<(u64, Option<String>), ProcessError> {
    let outcome = joined.map_err(|_| ProcessError::WorkerPanic {
        program: program.to_string(),
    })?;
    match outcome.drain_error {
        Some(source) => Err(ProcessError::Stream {
            program: program.to_string(),
            stream,
            source,
        }),
        None => {
            let note = outcome
                .filter_error
                .map(|e| format!("{stream} filter: {e}"));
            Ok((outcome.bytes, note))
        }
    }
}

/// What one stream worker observed.
struct PumpOutcome {
    bytes: u64,
    filter_error: Option<io::Error>,
    drain_error: Option<io::Error>,
}

/// Consumes one output stream: filter first, then an unconditional drain.
///
/// The drain runs even when the filter errors out, so the child can never
/// block on a full pipe because of a misbehaving filter.
fn pump(stream: impl Read, filter: Option<&mut dyn OutputFilter>) -> PumpOutcome {
    let mut counted = CountingReader::new(stream);
    let filter_error = match filter {
        Some(filter) => filter.consume(&mut counted).err(),
        None => None,
    };
    let drain_error = io::copy(&mut counted, &mut io::sink()).err();
    PumpOutcome {
        bytes: counted.bytes,
        filter_error,
        drain_error,
    }
}

/// A reader wrapper that counts the bytes passing through it.
struct CountingReader<R> {
    inner: R,
    bytes: u64,
}

impl<R: Read> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, bytes: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }
}

/// Convenience wrapper for callers that only need the default runner.
pub fn run(
    invocation: &ToolInvocation,
    handlers: StreamHandlers<'_>,
) -> Result<RunReport, ProcessError> {
    SystemRunner::new().run(invocation, handlers)
}

/// Returns `true` if `path` exists and looks runnable.
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::filter::{CollectingFilter, ErrorDetectingFilter, StaticInput};

    fn sh(script: &str) -> ToolInvocation {
        ToolInvocation::new("/bin/sh").args(["-c", script])
    }

    #[test]
    fn drains_both_streams_past_pipe_buffer() {
        // 70000 + 50000 bytes exceed the usual 64 KiB pipe buffer on each
        // side, so this deadlocks unless both streams are pumped concurrently.
        let inv = sh("head -c 70000 /dev/zero; head -c 50000 /dev/zero 1>&2");
        let report = run(&inv, StreamHandlers::none()).unwrap();
        assert_eq!(report.stdout_bytes, 70000);
        assert_eq!(report.stderr_bytes, 50000);
        assert!(report.exited_cleanly());
    }

    #[test]
    fn nonzero_exit_is_not_an_error() {
        let report = run(&sh("exit 3"), StreamHandlers::none()).unwrap();
        assert_eq!(report.exit_code, Some(3));
        assert!(!report.exited_cleanly());
    }

    #[test]
    fn missing_executable_is_launch_error() {
        let inv = ToolInvocation::new("/nonexistent/path/to/6g");
        let err = run(&inv, StreamHandlers::none()).unwrap_err();
        assert!(matches!(err, ProcessError::Launch { .. }));
    }

    #[test]
    fn error_filter_observes_stderr() {
        let detector = ErrorDetectingFilter::new();
        let mut attached = detector.clone();
        let inv = sh("echo 'dep.go:3: syntax error' 1>&2");
        let handlers = StreamHandlers::none().stderr(&mut attached);
        run(&inv, handlers).unwrap();
        assert!(detector.saw_error());
        assert_eq!(detector.lines(), vec!["dep.go:3: syntax error"]);
    }

    #[test]
    fn silent_child_leaves_filter_clean() {
        let detector = ErrorDetectingFilter::new();
        let mut out = detector.clone();
        let mut err = detector.clone();
        let inv = sh("true");
        let handlers = StreamHandlers::none().stdout(&mut out).stderr(&mut err);
        run(&inv, handlers).unwrap();
        assert!(!detector.saw_error());
    }

    #[test]
    fn stdin_feed_does_not_deadlock_against_stderr_flood() {
        // The child floods stderr beyond the pipe buffer before reading
        // stdin; only concurrent pumping and feeding lets this finish.
        let collector = CollectingFilter::new();
        let mut out = collector.clone();
        let mut feed = StaticInput::new(b"ready\n".to_vec());
        let inv = sh("head -c 200000 /dev/zero 1>&2; read line; echo \"got $line\"");
        let handlers = StreamHandlers::none().stdout(&mut out).stdin(&mut feed);
        let report = run(&inv, handlers).unwrap();
        assert_eq!(report.stderr_bytes, 200000);
        assert_eq!(collector.text().trim(), "got ready");
    }

    #[test]
    fn timeout_kills_hung_child() {
        let inv = sh("sleep 30").timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = run(&inv, StreamHandlers::none()).unwrap_err();
        assert!(matches!(err, ProcessError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn timeout_kills_descendants_holding_the_pipes() {
        // The shell forks a grandchild that inherits the pipe write ends;
        // killing only the direct child would leave the pumps blocked for
        // the grandchild's full lifetime.
        let inv = sh("sleep 30 & wait").timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = run(&inv, StreamHandlers::none()).unwrap_err();
        assert!(matches!(err, ProcessError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn working_directory_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let collector = CollectingFilter::new();
        let mut out = collector.clone();
        let inv = sh("pwd").cwd(dir.path());
        run(&inv, StreamHandlers::none().stdout(&mut out)).unwrap();
        let reported = std::fs::canonicalize(collector.text().trim()).unwrap();
        let expected = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(reported, expected);
    }

    #[test]
    fn environment_overlay_reaches_child() {
        let collector = CollectingFilter::new();
        let mut out = collector.clone();
        let inv = sh("echo \"$GOFORGE_TEST_VAR\"").env("GOFORGE_TEST_VAR", "overlay");
        run(&inv, StreamHandlers::none().stdout(&mut out)).unwrap();
        assert_eq!(collector.text().trim(), "overlay");
    }

    #[test]
    fn spawn_then_join_yields_report() {
        let collector = CollectingFilter::new();
        let handlers = OwnedStreamHandlers {
            stdout: Some(Box::new(collector.clone())),
            stderr: None,
            stdin: None,
        };
        let handle = SystemRunner::new().spawn(&sh("echo detached"), handlers).unwrap();
        let report = handle.join().unwrap();
        assert!(report.exited_cleanly());
        assert_eq!(collector.text().trim(), "detached");
    }

    #[test]
    fn spawn_detach_does_not_block() {
        let handle = SystemRunner::new()
            .spawn(&sh("true"), OwnedStreamHandlers::none())
            .unwrap();
        handle.detach();
    }

    #[test]
    fn is_executable_rejects_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("data.txt");
        std::fs::write(&plain, "not a program").unwrap();
        assert!(!is_executable(&plain));
        assert!(is_executable(Path::new("/bin/sh")));
    }
}
