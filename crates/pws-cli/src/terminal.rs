//! Notifications rendered on the terminal.

use pws_core::{Notifier, Severity};

/// Prints success messages to stdout and failures to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    fn render(severity: Severity, message: &str) -> String {
        match severity {
            Severity::Success => format!("✓ {}", message),
            Severity::Danger => format!("✗ {}", message),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify_once(&self, severity: Severity, message: &str) {
        let line = Self::render(severity, message);
        match severity {
            Severity::Success => println!("{}", line),
            Severity::Danger => eprintln!("{}", line),
        }
    }
}
