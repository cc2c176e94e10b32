//! Terminal rendering of build events.

use crate::event::LogEvent;
use crate::severity::Severity;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Renders events as `severity: message` lines for terminal output.
///
/// With color enabled the severity label is tinted per level: errors red,
/// warnings yellow, debug dimmed; the message itself stays plain.
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Renders a single event into a formatted line.
    pub fn render(&self, event: &LogEvent) -> String {
        let tint = match event.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Debug => DIM,
            Severity::Info => "",
        };
        if !self.color || tint.is_empty() {
            format!("{}: {}", event.severity, event.message)
        } else {
            format!("{tint}{}{RESET}: {}", event.severity, event.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rendering_without_color() {
        let renderer = TerminalRenderer::new(false);
        let line = renderer.render(&LogEvent::error("link failed"));
        assert_eq!(line, "error: link failed");
    }

    #[test]
    fn error_label_is_tinted_with_color() {
        let renderer = TerminalRenderer::new(true);
        let line = renderer.render(&LogEvent::error("link failed"));
        assert!(line.starts_with("\x1b[31merror\x1b[0m: "));
        assert!(line.ends_with("link failed"));
    }

    #[test]
    fn warning_label_is_tinted_with_color() {
        let renderer = TerminalRenderer::new(true);
        let line = renderer.render(&LogEvent::warning("stamp write failed"));
        assert!(line.starts_with("\x1b[33mwarning\x1b[0m: "));
    }

    #[test]
    fn info_stays_plain_even_with_color() {
        let renderer = TerminalRenderer::new(true);
        let line = renderer.render(&LogEvent::info("dep tool built"));
        assert_eq!(line, "info: dep tool built");
    }
}
