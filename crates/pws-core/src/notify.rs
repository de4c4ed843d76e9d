//! One-shot user notifications.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Severity {
    Success,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Danger => "danger",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget message surface. Nothing is acknowledged or kept.
pub trait Notifier: Send + Sync {
    fn notify_once(&self, severity: Severity, message: &str);
}

/// Notifier that only writes to the log, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_once(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Success => info!(text = message, "Notification"),
            Severity::Danger => warn!(text = message, "Notification"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{Notifier, Severity};

    /// Notifier that keeps every message for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<(Severity, String)>>,
    }

    impl RecordingNotifier {
        pub fn sent(&self) -> Vec<(Severity, String)> {
            self.sent.lock().expect("notifier lock").clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify_once(&self, severity: Severity, message: &str) {
            self.sent
                .lock()
                .expect("notifier lock")
                .push((severity, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_severity_wire_names() {
        assert_eq!(Severity::Success.to_string(), "success");
        assert_eq!(Severity::Danger.to_string(), "danger");
        assert_eq!(
            serde_json::to_string(&Severity::Danger).expect("serialize"),
            "\"danger\""
        );
    }

    /// Writer that appends formatted log lines to a shared buffer
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log lock")).into_owned()
        }
    }

    #[test]
    fn test_tracing_notifier_logs_by_severity() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let notifier: Box<dyn Notifier> = Box::new(TracingNotifier);
            notifier.notify_once(Severity::Success, "Goodbye");
            notifier.notify_once(Severity::Danger, "Connection error");
        });

        let lines: Vec<String> = log.contents().lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 2, "log was: {:?}", lines);
        assert!(lines[0].contains("INFO") && lines[0].contains("Goodbye"));
        assert!(lines[1].contains("WARN") && lines[1].contains("Connection error"));
    }
}
