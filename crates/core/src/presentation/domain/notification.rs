use std::fmt;

use crossbeam_channel::{Receiver, Sender};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-facing message, e.g. a camera that would not open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }
}

/// Cloneable handle used by workers to raise notifications.
pub type NotificationSender = Sender<Notification>;

/// Unbounded, so a worker never blocks on a slow dialog.
pub fn notification_channel() -> (NotificationSender, Receiver<Notification>) {
    crossbeam_channel::unbounded()
}

/// Sends `notification`, logging it as well. A dropped receiver is not an
/// error: nobody is listening any more.
pub fn notify(tx: &NotificationSender, notification: Notification) {
    match notification.severity {
        Severity::Error => log::error!("{}", notification.message),
        Severity::Warning => log::warn!("{}", notification.message),
        Severity::Info => log::info!("{}", notification.message),
    }
    let _ = tx.send(notification);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_delivers_in_order() {
        let (tx, rx) = notification_channel();
        notify(&tx, Notification::error("camera missing"));
        notify(&tx, Notification::info("done"));
        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![
                Notification::error("camera missing"),
                Notification::info("done")
            ]
        );
    }

    #[test]
    fn test_notify_after_receiver_dropped_is_silent() {
        let (tx, rx) = notification_channel();
        drop(rx);
        notify(&tx, Notification::warning("nobody home"));
    }

    #[test]
    fn test_severity_names() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.as_str(), "warning");
        assert_eq!(Severity::Info.as_str(), "info");
    }
}
