//! Strategy executors
//!
//! One executor per research strategy, all behind the `StrategyExecutor`
//! contract so the orchestrator can treat them uniformly. Strategy-specific
//! behavior lives entirely in here; the orchestrator never branches on a
//! concrete strategy.
//!
//! Cancellation is cooperative: executors call `ensure_live` between
//! sub-steps. An executor already blocked on an external call runs to the
//! next checkpoint; a late completion is discarded by the store's transition
//! guard.

pub mod deep;
pub mod fast;
pub mod simple;
pub mod structured;

use crate::ports::agent_gateway::GatewayError;
use crate::ports::documents::{DocumentError, DocumentSink, RenderedDocument};
use crate::ports::progress::ProgressReporter;
use crate::ports::work_items::{StorySummary, WorkItemError, WorkItemGateway};
use async_trait::async_trait;
use delve_domain::{
    FailureKind, JobFailure, ProjectContext, ResearchReport, ResearchRequest, ResearchStrategy,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use deep::{DeepExecutor, DeepResearchSettings};
pub use fast::FastExecutor;
pub use simple::SimpleExecutor;
pub use structured::StructuredExecutor;

/// Executor stage names recorded on progress notes and failures
pub mod stage {
    pub const STORY_FETCH: &str = "story_fetch";
    pub const CONTEXT_EXTRACT: &str = "context_extract";
    pub const TECHNICAL_RESEARCH: &str = "technical_research";
    pub const TEMPLATE_RESEARCH: &str = "template_research";
    pub const STRUCTURED_RESEARCH: &str = "structured_research";
    pub const DEEP_RESEARCH: &str = "deep_research";
    pub const DOC_PUBLISH: &str = "doc_publish";
}

/// Errors that can occur while executing a strategy
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("{stage}: {message}")]
    Failed {
        stage: String,
        kind: FailureKind,
        message: String,
    },

    #[error("Job cancelled")]
    Cancelled,
}

impl ExecutorError {
    pub fn failed(
        stage: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        ExecutorError::Failed {
            stage: stage.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn gateway(stage: &str, err: GatewayError) -> Self {
        Self::failed(stage, err.failure_kind(), err.to_string())
    }

    pub fn work_items(stage: &str, err: WorkItemError) -> Self {
        Self::failed(stage, err.failure_kind(), err.to_string())
    }

    pub fn documents(stage: &str, err: DocumentError) -> Self {
        Self::failed(stage, err.failure_kind(), err.to_string())
    }

    /// Convert into the failure recorded on the job record
    pub fn into_failure(self) -> JobFailure {
        match self {
            ExecutorError::Failed {
                stage,
                kind,
                message,
            } => JobFailure::new(kind, stage, message),
            ExecutorError::Cancelled => {
                JobFailure::new(FailureKind::Internal, "cancelled", "job cancelled")
            }
        }
    }
}

/// Contract shared by all strategy executors
#[async_trait]
pub trait StrategyExecutor: Send + Sync {
    /// The strategy this executor implements
    fn strategy(&self) -> ResearchStrategy;

    /// Run the strategy for one request
    async fn execute(
        &self,
        request: &ResearchRequest,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ResearchReport, ExecutorError>;
}

/// Cooperative cancellation checkpoint
pub(crate) fn ensure_live(cancel: &CancellationToken) -> Result<(), ExecutorError> {
    if cancel.is_cancelled() {
        return Err(ExecutorError::Cancelled);
    }
    Ok(())
}

/// Shared first step: fetch the work item and extract project context
pub(crate) async fn fetch_story_context(
    work_items: &dyn WorkItemGateway,
    story_id: &str,
    progress: &dyn ProgressReporter,
) -> Result<(StorySummary, ProjectContext), ExecutorError> {
    progress.report(stage::STORY_FETCH, "Fetching work item...");
    let story = work_items
        .fetch_story(story_id)
        .await
        .map_err(|e| ExecutorError::work_items(stage::STORY_FETCH, e))?;

    progress.report(stage::CONTEXT_EXTRACT, "Extracting project context...");
    let context = ProjectContext::from_story_summary(&story.summary_markdown, story_id);
    Ok((story, context))
}

/// Shared last step: publish the report and attach it to the work item
pub(crate) async fn publish_report(
    documents: &dyn DocumentSink,
    story_id: &str,
    title: &str,
    report: &ResearchReport,
    progress: &dyn ProgressReporter,
) -> Result<String, ExecutorError> {
    progress.report(stage::DOC_PUBLISH, "Generating document...");
    let document = RenderedDocument {
        title: title.to_string(),
        markdown: report.to_markdown(),
    };
    let handle = documents
        .publish(&document)
        .await
        .map_err(|e| ExecutorError::documents(stage::DOC_PUBLISH, e))?;
    documents
        .attach(&handle, story_id)
        .await
        .map_err(|e| ExecutorError::documents(stage::DOC_PUBLISH, e))?;
    Ok(handle.url)
}
