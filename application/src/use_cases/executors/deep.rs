//! Deep strategy: grounded long-running research.
//!
//! Delegates to the AI collaborator's deep-research run, which may take tens
//! of minutes. The run is guarded by a strategy-enforced deadline; a server
//! error from the backend is surfaced as a transient failure, distinct from
//! semantic failures, so callers know a resubmission may succeed.

use super::{ExecutorError, StrategyExecutor, ensure_live, fetch_story_context, publish_report, stage};
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::documents::DocumentSink;
use crate::ports::progress::ProgressReporter;
use crate::ports::work_items::WorkItemGateway;
use async_trait::async_trait;
use delve_domain::{
    FailureKind, ReportSection, ResearchPrompt, ResearchReport, ResearchRequest, ResearchStrategy,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_PROMPT: &str = "Provide a comprehensive analysis of architecture options, \
market landscape and delivery risks for this project.";

/// Deep-research tuning
#[derive(Debug, Clone)]
pub struct DeepResearchSettings {
    /// Deadline for the grounded run; elapsing records a Timeout failure
    pub timeout: Duration,
}

impl Default for DeepResearchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(45 * 60),
        }
    }
}

pub struct DeepExecutor {
    work_items: Arc<dyn WorkItemGateway>,
    agent: Arc<dyn AgentGateway>,
    documents: Arc<dyn DocumentSink>,
    settings: DeepResearchSettings,
}

impl DeepExecutor {
    pub fn new(
        work_items: Arc<dyn WorkItemGateway>,
        agent: Arc<dyn AgentGateway>,
        documents: Arc<dyn DocumentSink>,
        settings: DeepResearchSettings,
    ) -> Self {
        Self {
            work_items,
            agent,
            documents,
            settings,
        }
    }
}

#[async_trait]
impl StrategyExecutor for DeepExecutor {
    fn strategy(&self) -> ResearchStrategy {
        ResearchStrategy::Deep
    }

    async fn execute(
        &self,
        request: &ResearchRequest,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ResearchReport, ExecutorError> {
        let (story, context) =
            fetch_story_context(self.work_items.as_ref(), &request.story_id, progress).await?;
        ensure_live(cancel)?;

        let prompt = ResearchPrompt::deep(
            request.custom_prompt.as_deref().unwrap_or(DEFAULT_PROMPT),
            &context,
            &story.summary_markdown,
        );

        progress.report(
            stage::DEEP_RESEARCH,
            "Starting grounded deep research (this may take 20-30 minutes)...",
        );
        let answer = match tokio::time::timeout(
            self.settings.timeout,
            self.agent.deep_research(&prompt),
        )
        .await
        {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => return Err(ExecutorError::gateway(stage::DEEP_RESEARCH, e)),
            Err(_) => {
                return Err(ExecutorError::failed(
                    stage::DEEP_RESEARCH,
                    FailureKind::Timeout,
                    format!(
                        "deep research did not finish within {}s",
                        self.settings.timeout.as_secs()
                    ),
                ));
            }
        };
        // The external call cannot be interrupted; the signal is observed here
        ensure_live(cancel)?;

        let report =
            ResearchReport::new(format!("Deep research for {}", context.project_name))
                .with_section(ReportSection::new("Deep Research", answer.to_markdown()));

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
