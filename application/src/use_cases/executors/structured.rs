//! Structured strategy (`async`): a fixed sequence of research sub-steps.
//!
//! Runs one AI research call per requested research type, reporting progress
//! after each sub-step, then publishes the combined report. Target latency
//! is under ten minutes.

use super::{ExecutorError, StrategyExecutor, ensure_live, fetch_story_context, publish_report, stage};
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::documents::DocumentSink;
use crate::ports::progress::ProgressReporter;
use crate::ports::work_items::WorkItemGateway;
use async_trait::async_trait;
use delve_domain::{
    ReportSection, ResearchKind, ResearchPrompt, ResearchReport, ResearchRequest, ResearchStrategy,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct StructuredExecutor {
    work_items: Arc<dyn WorkItemGateway>,
    agent: Arc<dyn AgentGateway>,
    documents: Arc<dyn DocumentSink>,
}

impl StructuredExecutor {
    pub fn new(
        work_items: Arc<dyn WorkItemGateway>,
        agent: Arc<dyn AgentGateway>,
        documents: Arc<dyn DocumentSink>,
    ) -> Self {
        Self {
            work_items,
            agent,
            documents,
        }
    }
}

#[async_trait]
impl StrategyExecutor for StructuredExecutor {
    fn strategy(&self) -> ResearchStrategy {
        ResearchStrategy::Async
    }

    async fn execute(
        &self,
        request: &ResearchRequest,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ResearchReport, ExecutorError> {
        let (_, context) =
            fetch_story_context(self.work_items.as_ref(), &request.story_id, progress).await?;

        // Submit defaults the types per strategy; an empty list here means the
        // request was built outside the orchestrator, so fall back the same way.
        let kinds = if request.research_types.is_empty() {
            ResearchKind::defaults_for(ResearchStrategy::Async)
        } else {
            request.research_types.clone()
        };

        let mut report =
            ResearchReport::new(format!("Structured research for {}", context.project_name));
        for kind in kinds {
            ensure_live(cancel)?;
            progress.report(
                stage::STRUCTURED_RESEARCH,
                &format!("Performing {} research...", kind),
            );
            let prompt = ResearchPrompt::structured(kind, &context);
            let answer = self
                .agent
                .call(ResearchPrompt::analyst_instructions(), &prompt)
                .await
                .map_err(|e| ExecutorError::gateway(stage::STRUCTURED_RESEARCH, e))?;
            report = report.with_section(ReportSection::new(kind.heading(), answer));
        }
        ensure_live(cancel)?;

        let url = publish_report(
            self.documents.as_ref(),
            &request.story_id,
            &context.project_name,
            &report,
            progress,
        )
        .await?;
        Ok(report.with_document_url(url))
    }
}
