//! Transient user notifications.
//!
//! Validation failures and submission results are surfaced through an
//! injected [`Notifier`] capability rather than a process-wide broadcast, so
//! every component that raises a notice names the channel it talks to.

use std::cell::RefCell;
use std::fmt;

use colored::Colorize;

/// Visual style of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeStyle {
    Warning,
    Success,
    Danger,
}

impl fmt::Display for NoticeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoticeStyle::Warning => "warning",
            NoticeStyle::Success => "success",
            NoticeStyle::Danger => "danger",
        };
        write!(f, "{}", label)
    }
}

/// A single notice as handed to the host's toast/alert surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub style: NoticeStyle,
    pub message: String,
}

/// Capability for raising fire-and-forget user-facing notices.
pub trait Notifier {
    fn notify(&self, style: NoticeStyle, message: &str);

    fn warn(&self, message: &str) {
        self.notify(NoticeStyle::Warning, message);
    }

    fn succeed(&self, message: &str) {
        self.notify(NoticeStyle::Success, message);
    }

    fn fail(&self, message: &str) {
        self.notify(NoticeStyle::Danger, message);
    }
}

impl<T: Notifier + ?Sized> Notifier for std::rc::Rc<T> {
    fn notify(&self, style: NoticeStyle, message: &str) {
        (**self).notify(style, message)
    }
}

/// Writes notices to stdout with colored labels.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, style: NoticeStyle, message: &str) {
        let line = match style {
            NoticeStyle::Warning => format!("WARNING: [!] {}", message).bright_yellow(),
            NoticeStyle::Success => format!("SUCCESS: [\u{2713}] {}", message).bright_green(),
            NoticeStyle::Danger => format!("ERROR: [x] {}", message).bright_red(),
        };
        println!("{}", line);
    }
}

/// Captures notices in memory; used by tests and embedding hosts.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.notices.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, style: NoticeStyle, message: &str) {
        self.notices.borrow_mut().push(Notice {
            style,
            message: message.to_string(),
        });
    }
}
