//! Simple strategy: one work-item fetch plus a single AI research call.
//!
//! The cheapest end of the latency/depth trade-off, used for smoke-testing
//! the pipeline. No document is published.

use super::{ExecutorError, StrategyExecutor, ensure_live, fetch_story_context, stage};
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::ProgressReporter;
use crate::ports::work_items::WorkItemGateway;
use async_trait::async_trait;
use delve_domain::{
    ReportSection, ResearchKind, ResearchPrompt, ResearchReport, ResearchRequest, ResearchStrategy,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct SimpleExecutor {
    work_items: Arc<dyn WorkItemGateway>,
    agent: Arc<dyn AgentGateway>,
}

impl SimpleExecutor {
    pub fn new(work_items: Arc<dyn WorkItemGateway>, agent: Arc<dyn AgentGateway>) -> Self {
        Self { work_items, agent }
    }
}

#[async_trait]
impl StrategyExecutor for SimpleExecutor {
    fn strategy(&self) -> ResearchStrategy {
        ResearchStrategy::Simple
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

        progress.report(stage::TECHNICAL_RESEARCH, "Starting technical research...");
        let prompt = ResearchPrompt::structured(ResearchKind::Technical, &context);
        let answer = self
            .agent
            .call(ResearchPrompt::analyst_instructions(), &prompt)
            .await
            .map_err(|e| ExecutorError::gateway(stage::TECHNICAL_RESEARCH, e))?;

        Ok(
            ResearchReport::new(format!("Technical research for {}", context.project_name))
                .with_section(ReportSection::new("Story Details", story.summary_markdown))
                .with_section(ReportSection::new("Technical Research", answer)),
        )
    }
}
