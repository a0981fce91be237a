//! Research job entity and status state machine
//!
//! The job record is the unit of state tracked per submitted request. All
//! mutation goes through the `mark_*` methods, which enforce the status
//! state machine and keep `result`/`error` mutually exclusive. Once a record
//! reaches a terminal status, every further transition is rejected.

use crate::core::error::DomainError;
use crate::research::strategy::ResearchStrategy;
use crate::research::value_objects::{
    JobFailure, JobId, ProgressNote, ResearchReport, ResearchRequest,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a research job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, execution not yet started
    Pending,
    /// Executor is running
    Running,
    /// Executor finished and produced a report
    Completed,
    /// Executor failed; the record carries a `JobFailure`
    Failed,
    /// Cancellation was observed before completion
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Whether the state machine permits moving from `self` to `next`
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Pending, JobStatus::Running) => true,
            (JobStatus::Pending, JobStatus::Failed) => true,
            (JobStatus::Pending, JobStatus::Cancelled) => true,
            (JobStatus::Running, JobStatus::Completed) => true,
            (JobStatus::Running, JobStatus::Failed) => true,
            (JobStatus::Running, JobStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A research job record (Entity)
///
/// One record exists per submitted request. `id`, `strategy` and `input` are
/// fixed at creation; everything else is driven by the background execution
/// path through the mutation methods below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchJob {
    pub id: JobId,
    pub strategy: ResearchStrategy,
    pub input: ResearchRequest,
    pub status: JobStatus,
    pub result: Option<ResearchReport>,
    pub error: Option<JobFailure>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Ordered, append-only progress milestones
    pub progress: Vec<ProgressNote>,
}

impl ResearchJob {
    pub fn new(id: JobId, strategy: ResearchStrategy, input: ResearchRequest) -> Self {
        Self {
            id,
            strategy,
            input,
            status: JobStatus::Pending,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            progress: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Pending -> Running; records `started_at`
    pub fn mark_running(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(JobStatus::Running)?;
        self.started_at = Some(now);
        Ok(())
    }

    /// Running -> Completed; attaches the report and `completed_at`
    pub fn mark_completed(
        &mut self,
        report: ResearchReport,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.transition(JobStatus::Completed)?;
        self.result = Some(report);
        self.completed_at = Some(now);
        Ok(())
    }

    /// Pending|Running -> Failed; attaches the failure and `completed_at`
    pub fn mark_failed(
        &mut self,
        failure: JobFailure,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(failure);
        self.completed_at = Some(now);
        Ok(())
    }

    /// Pending|Running -> Cancelled
    pub fn mark_cancelled(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(JobStatus::Cancelled)?;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Append a progress note; rejected once the record is terminal
    pub fn push_note(&mut self, note: ProgressNote) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: self.status,
            });
        }
        self.progress.push(note);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::value_objects::FailureKind;

    fn job() -> ResearchJob {
        ResearchJob::new(
            JobId::from("simple-research-42-1"),
            ResearchStrategy::Simple,
            ResearchRequest::new("42"),
        )
    }

    #[test]
    fn test_new_job_is_pending_and_empty() {
        let job = job();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut job = job();
        job.mark_running(Utc::now()).unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());

        job.mark_completed(ResearchReport::new("done"), Utc::now())
            .unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.result.is_some());
        assert!(job.error.is_none());
        assert!(job.completed_at >= job.started_at);
    }

    #[test]
    fn test_terminal_status_is_write_once() {
        let mut job = job();
        job.mark_running(Utc::now()).unwrap();
        job.mark_cancelled(Utc::now()).unwrap();

        // A late completion racing the cancel must be rejected
        let err = job
            .mark_completed(ResearchReport::new("late"), Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: JobStatus::Cancelled,
                to: JobStatus::Completed,
            }
        );
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.result.is_none());
    }

    #[test]
    fn test_result_and_error_are_mutually_exclusive() {
        let mut job = job();
        job.mark_running(Utc::now()).unwrap();
        job.mark_failed(
            JobFailure::new(FailureKind::ExternalTransient, "deep_research", "503"),
            Utc::now(),
        )
        .unwrap();

        assert!(job.error.is_some());
        assert!(job.result.is_none());
        assert!(
            job.mark_completed(ResearchReport::new("late"), Utc::now())
                .is_err()
        );
        assert!(job.result.is_none());
    }

    #[test]
    fn test_pending_job_can_be_cancelled_or_failed_directly() {
        let mut cancelled = job();
        cancelled.mark_cancelled(Utc::now()).unwrap();
        assert_eq!(cancelled.status, JobStatus::Cancelled);

        let mut failed = job();
        failed
            .mark_failed(
                JobFailure::new(FailureKind::Internal, "startup", "boom"),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
    }

    #[test]
    fn test_pending_cannot_complete_without_running() {
        let mut job = job();
        assert!(
            job.mark_completed(ResearchReport::new("skip"), Utc::now())
                .is_err()
        );
    }

    #[test]
    fn test_progress_notes_append_in_order_until_terminal() {
        let mut job = job();
        job.mark_running(Utc::now()).unwrap();
        job.push_note(ProgressNote::new("story_fetch", "Fetching work item..."))
            .unwrap();
        job.push_note(ProgressNote::new("context_extract", "Extracting context..."))
            .unwrap();
        assert_eq!(job.progress.len(), 2);
        assert_eq!(job.progress[0].stage, "story_fetch");

        job.mark_completed(ResearchReport::new("done"), Utc::now())
            .unwrap();
        assert!(job.push_note(ProgressNote::new("late", "ignored")).is_err());
        assert_eq!(job.progress.len(), 2);
    }

    #[test]
    fn test_self_transition_is_rejected() {
        let mut job = job();
        job.mark_running(Utc::now()).unwrap();
        let started = job.started_at;
        assert!(job.mark_running(Utc::now()).is_err());
        assert_eq!(job.started_at, started);
    }
}
