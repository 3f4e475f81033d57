//! Core logging types: target entries, status, and the [`Log`] trait.

/// Per-target sync result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Target (or step) name.
    pub name: String,
    /// Final status.
    pub status: TaskStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed target or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Completed successfully.
    Ok,
    /// Explicitly skipped (e.g., nothing to bundle).
    Skipped,
    /// Ran in dry-run mode; nothing was uploaded.
    DryRun,
    /// Encountered an error and could not complete.
    Failed,
}

/// Abstraction over logging backends.
///
/// Collection and restore code logs through this trait so unit tests can
/// capture warnings without installing a global subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a per-target result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
