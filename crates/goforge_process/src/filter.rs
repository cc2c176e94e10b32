//! Stream filters: pluggable consumers for subprocess output and input.
//!
//! Build tools of the gc lineage report most failures as lines on their
//! output streams rather than through exit codes, so callers attach an
//! [`OutputFilter`] to classify a stream while the runner keeps it drained.
//! The set of filters is deliberately small and closed: [`NullFilter`],
//! [`ErrorDetectingFilter`], and [`CollectingFilter`] cover every use in the
//! build pipeline.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::{Arc, Mutex};

/// A consumer for one output stream of a subprocess.
///
/// The runner hands the live stream to [`consume`](Self::consume), then
/// unconditionally drains whatever the filter left unread, so an
/// implementation may stop early (or fail) without ever blocking the
/// subprocess on a full pipe buffer. Implementations must be reusable:
/// [`reset`](Self::reset) returns the filter to its freshly-constructed
/// state so one instance can serve several invocations.
pub trait OutputFilter: Send {
    /// Reads from the stream, recording whatever this filter is interested
    /// in. Returning an error never aborts the run; the runner records it in
    /// the report and keeps draining.
    fn consume(&mut self, stream: &mut dyn Read) -> io::Result<()>;

    /// Clears all recorded state so the filter can be reused.
    fn reset(&mut self);
}

/// A producer for the stdin stream of a subprocess.
///
/// The runner calls [`feed`](Self::feed) on a dedicated worker and closes
/// the pipe when it returns, delivering EOF to the child.
pub trait InputFeed: Send {
    /// Writes this feed's payload into the child's stdin.
    fn feed(&mut self, stdin: &mut dyn Write) -> io::Result<()>;
}

/// A filter that records nothing; the runner's drain consumes the stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullFilter;

impl OutputFilter for NullFilter {
    fn consume(&mut self, _stream: &mut dyn Read) -> io::Result<()> {
        Ok(())
    }

    fn reset(&mut self) {}
}

#[derive(Debug, Default)]
struct DetectorState {
    saw_error: bool,
    lines: Vec<String>,
}

/// A line-oriented filter that treats any non-empty line as failure evidence.
///
/// The gc-era compilers and linkers are silent on success, so the presence
/// of output is itself the error signal. Clones share state: attach a clone
/// to each stream of an invocation and inspect the original afterwards.
#[derive(Clone, Debug, Default)]
pub struct ErrorDetectingFilter {
    state: Arc<Mutex<DetectorState>>,
}

impl ErrorDetectingFilter {
    /// Creates a filter that has seen no output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any non-empty line has been observed since the last
    /// reset.
    pub fn saw_error(&self) -> bool {
        self.state.lock().unwrap().saw_error
    }

    /// Returns the lines observed since the last reset.
    pub fn lines(&self) -> Vec<String> {
        self.state.lock().unwrap().lines.clone()
    }
}

impl OutputFilter for ErrorDetectingFilter {
    fn consume(&mut self, stream: &mut dyn Read) -> io::Result<()> {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let text = line.trim_end_matches(['\r', '\n']);
            if !text.is_empty() {
                let mut state = self.state.lock().unwrap();
                state.saw_error = true;
                state.lines.push(text.to_string());
            }
        }
    }

    fn reset(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.saw_error = false;
        state.lines.clear();
    }
}

/// A filter that captures the entire stream for later inspection.
///
/// Clones share the captured buffer, like [`ErrorDetectingFilter`].
#[derive(Clone, Debug, Default)]
pub struct CollectingFilter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CollectingFilter {
    /// Creates a filter with an empty capture buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the captured bytes.
    pub fn bytes(&self) -> Vec<u8> {
        self.buffer.lock().unwrap().clone()
    }

    /// Returns the captured bytes as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl OutputFilter for CollectingFilter {
    fn consume(&mut self, stream: &mut dyn Read) -> io::Result<()> {
        let mut buffer = self.buffer.lock().unwrap();
        io::copy(stream, &mut *buffer)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.buffer.lock().unwrap().clear();
    }
}

/// An input feed that writes a fixed payload and closes stdin.
#[derive(Clone, Debug)]
pub struct StaticInput {
    payload: Vec<u8>,
}

impl StaticInput {
    /// Creates a feed for the given payload.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

impl InputFeed for StaticInput {
    fn feed(&mut self, stdin: &mut dyn Write) -> io::Result<()> {
        stdin.write_all(&self.payload)?;
        stdin.flush()
    }
}
