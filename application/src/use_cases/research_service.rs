//! Unified research service
//!
//! The orchestrator: accepts a request, creates the job record, resolves the
//! strategy to an executor, launches execution on its own tokio task and
//! mediates status/cancellation/listing against the job store. Completion is
//! communicated back through the store, never via a callback into the
//! submitter.

use crate::ports::progress::ProgressReporter;
use crate::store::{JobFilter, JobStore, StoreError};
use crate::use_cases::executors::{ExecutorError, StrategyExecutor};
use chrono::Utc;
use delve_domain::{
    FailureKind, JobFailure, JobId, JobStatus, ProgressNote, ResearchJob, ResearchKind,
    ResearchRequest, ResearchStrategy,
};
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors returned synchronously by the service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No executor registered for strategy {0}")]
    UnknownStrategy(ResearchStrategy),

    #[error("No job found for id {0}")]
    NotFound(JobId),
}

/// Result of a cancellation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The cancellation signal was raised; the job stops at its next checkpoint
    Signalled,
    /// The job already reached a terminal status
    AlreadyTerminal,
}

type CancelRegistry = Arc<Mutex<HashMap<JobId, CancellationToken>>>;

/// The job orchestration and strategy-dispatch engine
pub struct ResearchService {
    store: Arc<JobStore>,
    executors: HashMap<ResearchStrategy, Arc<dyn StrategyExecutor>>,
    cancellations: CancelRegistry,
}

impl ResearchService {
    pub fn builder(store: Arc<JobStore>) -> ResearchServiceBuilder {
        ResearchServiceBuilder {
            store,
            executors: HashMap::new(),
        }
    }

    /// Create a job record and schedule execution without blocking the caller
    pub fn submit(
        &self,
        strategy: ResearchStrategy,
        request: ResearchRequest,
    ) -> Result<JobId, ServiceError> {
        let executor = self
            .executors
            .get(&strategy)
            .cloned()
            .ok_or(ServiceError::UnknownStrategy(strategy))?;

        let mut request = request;
        if request.research_types.is_empty() {
            request.research_types = ResearchKind::defaults_for(strategy);
        }

        let id = self.store.create(strategy, request.clone());
        let token = CancellationToken::new();
        self.cancellations
            .lock()
            .expect("cancel registry lock poisoned")
            .insert(id.clone(), token.clone());

        info!(job = %id, %strategy, story = %request.story_id, "research job submitted");

        let store = Arc::clone(&self.store);
        let cancellations = Arc::clone(&self.cancellations);
        let job_id = id.clone();
        tokio::spawn(async move {
            drive_job(store, cancellations, job_id, executor, request, token).await;
        });

        Ok(id)
    }

    /// Snapshot of the job record
    pub fn status(&self, id: &JobId) -> Result<ResearchJob, ServiceError> {
        self.store
            .get(id)
            .map_err(|_| ServiceError::NotFound(id.clone()))
    }

    /// Raise a cooperative cancellation signal for a non-terminal job
    pub fn cancel(&self, id: &JobId) -> Result<CancelOutcome, ServiceError> {
        let job = self
            .store
            .get(id)
            .map_err(|_| ServiceError::NotFound(id.clone()))?;
        if job.is_terminal() {
            return Ok(CancelOutcome::AlreadyTerminal);
        }

        if let Some(token) = self
            .cancellations
            .lock()
            .expect("cancel registry lock poisoned")
            .get(id)
        {
            token.cancel();
        }

        // A pending (or just-started) job is moved to Cancelled directly; if
        // natural completion wins the race the rejected write is dropped and
        // the recorded terminal state stands.
        match self.store.update(id, |job| job.mark_cancelled(Utc::now())) {
            Ok(()) => info!(job = %id, "research job cancelled"),
            Err(StoreError::Rejected(reason)) => {
                debug!(job = %id, %reason, "cancel lost the race to a terminal state");
            }
            Err(StoreError::NotFound(_)) => return Err(ServiceError::NotFound(id.clone())),
        }
        Ok(CancelOutcome::Signalled)
    }

    /// Snapshot all jobs matching the filter, in creation order
    pub fn list(&self, filter: &JobFilter) -> Vec<ResearchJob> {
        self.store.list(filter)
    }
}

/// Builder wiring executors into the service
pub struct ResearchServiceBuilder {
    store: Arc<JobStore>,
    executors: HashMap<ResearchStrategy, Arc<dyn StrategyExecutor>>,
}

impl ResearchServiceBuilder {
    pub fn executor(mut self, executor: Arc<dyn StrategyExecutor>) -> Self {
        self.executors.insert(executor.strategy(), executor);
        self
    }

    pub fn build(self) -> ResearchService {
        ResearchService {
            store: self.store,
            executors: self.executors,
            cancellations: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Progress reporter that appends notes to the job record
struct StoreProgress {
    store: Arc<JobStore>,
    id: JobId,
}

impl ProgressReporter for StoreProgress {
    fn report(&self, stage: &str, message: &str) {
        debug!(job = %self.id, stage, message, "progress");
        if let Err(err) = self
            .store
            .update(&self.id, |job| job.push_note(ProgressNote::new(stage, message)))
        {
            // Terminal record; the note arrived after the job stopped
            debug!(job = %self.id, %err, "dropping late progress note");
        }
    }
}

/// Background execution path for one job.
///
/// Transitions Pending -> Running, runs the executor, and applies the first
/// terminal transition that reaches the store. A transition rejected because
/// the record is already terminal is dropped: that is the idempotent-stop
/// rule that resolves completion/cancellation races.
async fn drive_job(
    store: Arc<JobStore>,
    cancellations: CancelRegistry,
    id: JobId,
    executor: Arc<dyn StrategyExecutor>,
    request: ResearchRequest,
    token: CancellationToken,
) {
    let started = store.update(&id, |job| job.mark_running(Utc::now()));
    match started {
        Ok(()) => {}
        Err(err) => {
            // Cancelled (or otherwise terminal) before execution began
            debug!(job = %id, %err, "job not started");
            cancellations
                .lock()
                .expect("cancel registry lock poisoned")
                .remove(&id);
            return;
        }
    }

    let reporter = StoreProgress {
        store: Arc::clone(&store),
        id: id.clone(),
    };
    let outcome = AssertUnwindSafe(executor.execute(&request, &reporter, &token))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            Err(ExecutorError::failed(
                "executor",
                FailureKind::Internal,
                "executor panicked",
            ))
        });

    let write = match outcome {
        Ok(report) => {
            info!(job = %id, "research job completed");
            store.update(&id, |job| job.mark_completed(report, Utc::now()))
        }
        Err(ExecutorError::Cancelled) => {
            info!(job = %id, "research job observed cancellation");
            store.update(&id, |job| job.mark_cancelled(Utc::now()))
        }
        Err(err) => {
            warn!(job = %id, error = %err, "research job failed");
            let failure: JobFailure = err.into_failure();
            store.update(&id, |job| job.mark_failed(failure, Utc::now()))
        }
    };
    if let Err(StoreError::Rejected(reason)) = write {
        debug!(job = %id, %reason, "dropping late terminal transition");
    }

    cancellations
        .lock()
        .expect("cancel registry lock poisoned")
        .remove(&id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        BlockedAgent, FailingAgent, MissingWorkItems, RecordingDocuments, ScriptedAgent,
        StaticWorkItems,
    };
    use crate::ports::agent_gateway::{AgentGateway, GatewayError};
    use crate::use_cases::executors::{
        DeepExecutor, DeepResearchSettings, FastExecutor, SimpleExecutor, StructuredExecutor,
    };
    use std::time::Duration;

    fn full_service(agent: Arc<dyn AgentGateway>) -> ResearchService {
        let store = Arc::new(JobStore::new());
        let work_items = Arc::new(StaticWorkItems);
        let documents = Arc::new(RecordingDocuments::default());
        ResearchService::builder(store)
            .executor(Arc::new(SimpleExecutor::new(
                Arc::clone(&work_items) as _,
                Arc::clone(&agent),
            )))
            .executor(Arc::new(FastExecutor::new(
                Arc::clone(&work_items) as _,
                Arc::clone(&documents) as _,
            )))
            .executor(Arc::new(StructuredExecutor::new(
                Arc::clone(&work_items) as _,
                Arc::clone(&agent),
                Arc::clone(&documents) as _,
            )))
            .executor(Arc::new(DeepExecutor::new(
                work_items as _,
                agent,
                documents as _,
                DeepResearchSettings::default(),
            )))
            .build()
    }

    /// Poll until the job reaches a terminal status
    async fn wait_terminal(service: &ResearchService, id: &JobId) -> ResearchJob {
        for _ in 0..500 {
            let job = service.status(id).unwrap();
            if job.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {id} did not reach a terminal status");
    }

    #[tokio::test]
    async fn test_submit_returns_immediately_resolvable_id() {
        let service = full_service(Arc::new(ScriptedAgent::answering("findings")));
        let id = service
            .submit(ResearchStrategy::Simple, ResearchRequest::new("42"))
            .unwrap();

        let job = service.status(&id).unwrap();
        assert!(matches!(
            job.status,
            JobStatus::Pending | JobStatus::Running | JobStatus::Completed
        ));

        let job = wait_terminal(&service, &id).await;
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.result.is_some());
        assert!(job.error.is_none());
        assert!(job.started_at.is_some());
        assert!(job.completed_at >= job.started_at);
    }

    #[tokio::test]
    async fn test_unknown_strategy_creates_no_record() {
        let store = Arc::new(JobStore::new());
        let service = ResearchService::builder(Arc::clone(&store)).build();

        let err = service
            .submit(ResearchStrategy::Deep, ResearchRequest::new("42"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownStrategy(_)));
        assert!(store.is_empty());
        assert!(service.list(&JobFilter::default()).is_empty());
    }

    #[tokio::test]
    async fn test_unsubmitted_id_is_not_found() {
        let service = full_service(Arc::new(ScriptedAgent::answering("findings")));
        let missing = JobId::from("never-submitted");
        assert!(matches!(
            service.status(&missing),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.cancel(&missing),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deep_server_error_surfaces_as_transient_failure() {
        let service = full_service(Arc::new(FailingAgent::new(|| {
            GatewayError::Server("run failed: server_error".into())
        })));
        let id = service
            .submit(ResearchStrategy::Deep, ResearchRequest::new("42"))
            .unwrap();

        let job = wait_terminal(&service, &id).await;
        assert_eq!(job.status, JobStatus::Failed);
        let failure = job.error.unwrap();
        assert_eq!(failure.kind, FailureKind::ExternalTransient);
        assert!(failure.kind.is_retriable());
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn test_cancel_running_job_stops_at_next_checkpoint() {
        let (agent, release) = BlockedAgent::new();
        let service = full_service(Arc::new(agent));
        let id = service
            .submit(ResearchStrategy::Simple, ResearchRequest::new("42"))
            .unwrap();

        // Let the job reach the blocking external call
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(service.cancel(&id).unwrap(), CancelOutcome::Signalled);

        // Unblock the call; its late result must be discarded
        release.notify_one();
        let job = wait_terminal(&service, &id).await;
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_already_terminal() {
        let service = full_service(Arc::new(ScriptedAgent::answering("findings")));
        let id = service
            .submit(ResearchStrategy::Fast, ResearchRequest::new("42"))
            .unwrap();
        wait_terminal(&service, &id).await;

        assert_eq!(service.cancel(&id).unwrap(), CancelOutcome::AlreadyTerminal);
        assert_eq!(service.status(&id).unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_completion_and_cancel_race_yields_one_consistent_terminal_state() {
        for _ in 0..20 {
            let service = full_service(Arc::new(ScriptedAgent::answering("findings")));
            let id = service
                .submit(ResearchStrategy::Fast, ResearchRequest::new("42"))
                .unwrap();
            service.cancel(&id).unwrap();

            let job = wait_terminal(&service, &id).await;
            match job.status {
                JobStatus::Completed => {
                    assert!(job.result.is_some());
                    assert!(job.error.is_none());
                }
                JobStatus::Cancelled => {
                    assert!(job.result.is_none());
                    assert!(job.error.is_none());
                }
                other => panic!("unexpected terminal status {other}"),
            }
            // The terminal state is stable after the race settles
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(service.status(&id).unwrap().status, job.status);
        }
    }

    #[tokio::test]
    async fn test_slow_deep_job_does_not_delay_simple_jobs() {
        let service = full_service(Arc::new(
            ScriptedAgent::answering("findings").with_delay(Duration::from_millis(300)),
        ));
        let deep = service
            .submit(ResearchStrategy::Deep, ResearchRequest::new("slow"))
            .unwrap();
        // Fast strategy makes no agent call, so it is unaffected by the delay
        let fast = service
            .submit(ResearchStrategy::Fast, ResearchRequest::new("quick"))
            .unwrap();

        let fast_job = wait_terminal(&service, &fast).await;
        assert_eq!(fast_job.status, JobStatus::Completed);
        assert!(!service.status(&deep).unwrap().is_terminal());

        let deep_job = wait_terminal(&service, &deep).await;
        assert_eq!(deep_job.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_all_reach_terminal_states() {
        let service = Arc::new(full_service(Arc::new(ScriptedAgent::answering("findings"))));
        let mut ids = Vec::new();
        for strategy in ResearchStrategy::all() {
            ids.push(
                service
                    .submit(strategy, ResearchRequest::new("42"))
                    .unwrap(),
            );
        }
        for id in &ids {
            let job = wait_terminal(&service, id).await;
            assert_eq!(job.status, JobStatus::Completed);
        }
        assert_eq!(service.list(&JobFilter::default()).len(), 4);
    }

    #[tokio::test]
    async fn test_failure_in_one_job_does_not_affect_others() {
        let store = Arc::new(JobStore::new());
        let documents = Arc::new(RecordingDocuments::default());
        let service = ResearchService::builder(Arc::clone(&store))
            .executor(Arc::new(SimpleExecutor::new(
                Arc::new(MissingWorkItems),
                Arc::new(ScriptedAgent::answering("unused")),
            )))
            .executor(Arc::new(FastExecutor::new(
                Arc::new(StaticWorkItems),
                documents as _,
            )))
            .build();

        let failing = service
            .submit(ResearchStrategy::Simple, ResearchRequest::new("404"))
            .unwrap();
        let healthy = service
            .submit(ResearchStrategy::Fast, ResearchRequest::new("42"))
            .unwrap();

        assert_eq!(
            wait_terminal(&service, &failing).await.status,
            JobStatus::Failed
        );
        assert_eq!(
            wait_terminal(&service, &healthy).await.status,
            JobStatus::Completed
        );

        // The service still accepts new submissions
        let next = service
            .submit(ResearchStrategy::Fast, ResearchRequest::new("43"))
            .unwrap();
        assert_eq!(
            wait_terminal(&service, &next).await.status,
            JobStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_progress_notes_are_ordered_and_precede_result() {
        let service = full_service(Arc::new(ScriptedAgent::answering("findings")));
        let id = service
            .submit(
                ResearchStrategy::Async,
                ResearchRequest::new("42")
                    .with_research_types(vec![ResearchKind::Technical, ResearchKind::Market]),
            )
            .unwrap();

        let job = wait_terminal(&service, &id).await;
        assert_eq!(job.status, JobStatus::Completed);

        let stages: Vec<&str> = job.progress.iter().map(|n| n.stage.as_str()).collect();
        assert_eq!(stages[0], "story_fetch");
        assert_eq!(
            stages
                .iter()
                .filter(|s| **s == "structured_research")
                .count(),
            2
        );
        // Notes are monotonically timestamped
        for pair in job.progress.windows(2) {
            assert!(pair[0].at <= pair[1].at);
        }
        assert!(job.result.unwrap().document_url.is_some());
    }

    #[tokio::test]
    async fn test_async_strategy_defaults_research_types_at_submit() {
        let service = full_service(Arc::new(ScriptedAgent::answering("findings")));
        let id = service
            .submit(ResearchStrategy::Async, ResearchRequest::new("42"))
            .unwrap();

        let job = service.status(&id).unwrap();
        assert_eq!(
            job.input.research_types,
            vec![ResearchKind::Technical, ResearchKind::Market]
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_strategy_and_status() {
        let service = full_service(Arc::new(ScriptedAgent::answering("findings")));
        let simple = service
            .submit(ResearchStrategy::Simple, ResearchRequest::new("1"))
            .unwrap();
        let fast = service
            .submit(ResearchStrategy::Fast, ResearchRequest::new("2"))
            .unwrap();
        wait_terminal(&service, &simple).await;
        wait_terminal(&service, &fast).await;

        let completed = service.list(&JobFilter::default().with_status(JobStatus::Completed));
        assert_eq!(completed.len(), 2);
        assert_eq!(completed[0].id, simple);

        let fast_only =
            service.list(&JobFilter::default().with_strategy(ResearchStrategy::Fast));
        assert_eq!(fast_only.len(), 1);
        assert_eq!(fast_only[0].id, fast);
    }
}
