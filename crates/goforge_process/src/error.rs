//! Error types for external tool invocation.

use std::time::Duration;

/// Errors that can occur while launching or supervising an external tool.
///
/// A non-zero exit status is deliberately NOT an error at this layer. Build
/// tools of the gc toolchain era report problems through their output, so
/// callers inspect filter evidence and the [`RunReport`](crate::RunReport)
/// instead. This enum covers only failures of the invocation machinery
/// itself.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The process could not be launched at all (missing executable,
    /// permission problem).
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        /// The program that failed to start.
        program: String,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// A requested pipe to the child was not available after spawn.
    #[error("failed to capture {stream} of `{program}`")]
    StreamCapture {
        /// The program being run.
        program: String,
        /// Which stream could not be captured.
        stream: &'static str,
    },

    /// A stream worker hit an I/O error while draining; the child was killed.
    #[error("i/o error on {stream} of `{program}`: {source}")]
    Stream {
        /// The program being run.
        program: String,
        /// Which stream failed.
        stream: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The child did not finish within the invocation timeout and was killed.
    #[error("`{program}` did not finish within {timeout:?} and was killed")]
    TimedOut {
        /// The program that was killed.
        program: String,
        /// The configured timeout.
        timeout: Duration,
    },

    /// Waiting on the child process failed.
    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        /// The program being waited on.
        program: String,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// A detached worker thread panicked before producing a report.
    #[error("worker thread for `{program}` panicked")]
    WorkerPanic {
        /// The program whose worker died.
        program: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_display() {
        let err = ProcessError::Launch {
            program: "/opt/go/bin/6g".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to launch"));
        assert!(msg.contains("6g"));
    }

    #[test]
    fn timed_out_display() {
        let err = ProcessError::TimedOut {
            program: "6l".to_string(),
            timeout: Duration::from_secs(60),
        };
        let msg = err.to_string();
        assert!(msg.contains("6l"));
        assert!(msg.contains("killed"));
    }

    #[test]
    fn stream_display() {
        let err = ProcessError::Stream {
            program: "dep".to_string(),
            stream: "stderr",
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe"),
        };
        let msg = err.to_string();
        assert!(msg.contains("stderr"));
        assert!(msg.contains("dep"));
    }
}
