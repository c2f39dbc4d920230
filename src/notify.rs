//! Out-of-band notices to the local user (pairing codes).

use console::style;
use parking_lot::Mutex;

/// Shows a message to the person sitting at this machine.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Prints notices to the terminal running the bridge.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) {
        tracing::info!(title, "user notified");
        eprintln!("{} {}", style("\u{2139}").blue().bold(), style(title).bold());
        eprintln!("  {message}");
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent `(title, message)` pair.
    pub fn last(&self) -> Option<(String, String)> {
        self.messages.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.messages
            .lock()
            .push((title.to_string(), message.to_string()));
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, title: &str, message: &str) {
        (**self).notify(title, message)
    }
}
