//! Progress reporting and cooperative cancellation
//!
//! The IDE's job infrastructure supplies the real implementation; the core
//! only labels phases and polls for cancellation between retry attempts.

/// Caller-supplied progress sink
pub trait ProgressReporter: Send + Sync {
    /// Announce the phase the operation is entering
    fn begin_phase(&self, label: &str);

    /// Whether the caller has requested cancellation
    fn is_cancelled(&self) -> bool;
}

/// Progress reporter that ignores phases and never cancels
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn begin_phase(&self, _label: &str) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}
