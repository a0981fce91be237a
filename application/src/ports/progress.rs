//! Progress reporting port
//!
//! Executors push milestones through this handle instead of touching the job
//! store directly, which keeps them independently testable with a fake
//! reporter.

/// Callback for progress milestones during job execution
pub trait ProgressReporter: Send + Sync {
    /// Record a milestone for the current stage
    fn report(&self, stage: &str, message: &str);
}

/// No-op progress reporter
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _stage: &str, _message: &str) {}
}
