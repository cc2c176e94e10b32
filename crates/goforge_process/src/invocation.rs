//! Description of a single external tool invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A description of one external tool run.
///
/// Plain data, built fresh per invocation and owned by the caller. The
/// environment is an overlay applied on top of the inherited process
/// environment, not a replacement. When no working directory is set, the
/// runner falls back to the program's own parent directory at spawn time.
#[derive(Clone, Debug)]
pub struct ToolInvocation {
    /// Path to the executable (absolute, or resolvable via `PATH`).
    pub program: PathBuf,
    /// Ordered command-line arguments, not including the program itself.
    pub args: Vec<String>,
    /// Working directory for the child; defaults to the program's parent.
    pub cwd: Option<PathBuf>,
    /// Environment variables layered over the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Kill the child if it has not exited within this duration.
    pub timeout: Option<Duration>,
}

impl ToolInvocation {
    /// Creates an invocation of `program` with no arguments, inherited
    /// environment, default working directory, and no timeout.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            timeout: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Adds one environment variable to the overlay.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Merges a map of environment variables into the overlay.
    pub fn envs(mut self, vars: &BTreeMap<String, String>) -> Self {
        for (key, value) in vars {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    /// Sets the kill timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The directory the child will actually run in: the explicit working
    /// directory if set, otherwise the program's parent directory.
    pub fn effective_cwd(&self) -> Option<&Path> {
        match &self.cwd {
            Some(dir) => Some(dir.as_path()),
            None => self.program.parent().filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// A printable form of the command line, for log events.
    pub fn display_command(&self) -> String {
        let mut out = self.program.display().to_string();
        for arg in &self.args {
            out.push(' ');
            out.push_str(arg);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates() {
        let inv = ToolInvocation::new("/opt/go/bin/6g")
            .arg("-o")
            .arg("dep.6")
            .arg("dep.go")
            .env("GOOS", "linux")
            .timeout(Duration::from_secs(60));
        assert_eq!(inv.program, PathBuf::from("/opt/go/bin/6g"));
        assert_eq!(inv.args, vec!["-o", "dep.6", "dep.go"]);
        assert_eq!(inv.env.get("GOOS").map(String::as_str), Some("linux"));
        assert_eq!(inv.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn effective_cwd_prefers_explicit() {
        let inv = ToolInvocation::new("/opt/go/bin/6g").cwd("/tmp/tools");
        assert_eq!(inv.effective_cwd(), Some(Path::new("/tmp/tools")));
    }

    #[test]
    fn effective_cwd_falls_back_to_program_parent() {
        let inv = ToolInvocation::new("/opt/go/bin/6g");
        assert_eq!(inv.effective_cwd(), Some(Path::new("/opt/go/bin")));
    }

    #[test]
    fn effective_cwd_none_for_bare_name() {
        let inv = ToolInvocation::new("6g");
        assert_eq!(inv.effective_cwd(), None);
    }

    #[test]
    fn envs_merges_map() {
        let mut overlay = BTreeMap::new();
        overlay.insert("GOROOT".to_string(), "/opt/go".to_string());
        overlay.insert("GOARCH".to_string(), "amd64".to_string());
        let inv = ToolInvocation::new("6g").env("GOOS", "linux").envs(&overlay);
        assert_eq!(inv.env.len(), 3);
    }

    #[test]
    fn display_command_joins_args() {
        let inv = ToolInvocation::new("/opt/go/bin/6l").args(["-o", "dep", "dep.6"]);
        assert_eq!(inv.display_command(), "/opt/go/bin/6l -o dep dep.6");
    }
}
