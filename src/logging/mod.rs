//! Logging infrastructure for structured console and file output.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, TaskEntry, TaskStatus};

/// A [`Log`] implementation that records everything in memory.
///
/// Used by unit tests to assert on warnings emitted during collection and
/// restore without installing a global subscriber.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryLog {
    entries: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl MemoryLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// All messages recorded at the given level (e.g. `"warn"`).
    pub(crate) fn messages(&self, level: &str) -> Vec<String> {
        self.entries.lock().map_or_else(
            |_| Vec::new(),
            |g| {
                g.iter()
                    .filter(|(l, _)| l == level)
                    .map(|(_, m)| m.clone())
                    .collect()
            },
        )
    }

    fn push(&self, level: &str, msg: &str) {
        if let Ok(mut g) = self.entries.lock() {
            g.push((level.to_string(), msg.to_string()));
        }
    }
}

#[cfg(test)]
impl Log for MemoryLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record_task(&self, name: &str, _status: TaskStatus, _message: Option<&str>) {
        self.push("task", name);
    }
}
