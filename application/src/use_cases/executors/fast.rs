//! Fast strategy: template-based research with no AI round trips.
//!
//! Fills the offline report templates from lightly-processed work-item
//! context and publishes the result. Bounded latency of a few minutes,
//! dominated by the work-item fetch and document publication.

use super::{ExecutorError, StrategyExecutor, ensure_live, fetch_story_context, publish_report, stage};
use crate::ports::documents::DocumentSink;
use crate::ports::progress::ProgressReporter;
use crate::ports::work_items::WorkItemGateway;
use async_trait::async_trait;
use delve_domain::{
    ReportSection, ReportTemplate, ResearchKind, ResearchReport, ResearchRequest, ResearchStrategy,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct FastExecutor {
    work_items: Arc<dyn WorkItemGateway>,
    documents: Arc<dyn DocumentSink>,
}

impl FastExecutor {
    pub fn new(work_items: Arc<dyn WorkItemGateway>, documents: Arc<dyn DocumentSink>) -> Self {
        Self {
            work_items,
            documents,
        }
    }

    const TEMPLATE_KINDS: [ResearchKind; 3] = [
        ResearchKind::Technical,
        ResearchKind::Market,
        ResearchKind::Risk,
    ];
}

#[async_trait]
impl StrategyExecutor for FastExecutor {
    fn strategy(&self) -> ResearchStrategy {
        ResearchStrategy::Fast
    }

    async fn execute(
        &self,
        request: &ResearchRequest,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ResearchReport, ExecutorError> {
        let (_, context) =
            fetch_story_context(self.work_items.as_ref(), &request.story_id, progress).await?;
        ensure_live(cancel)?;

        progress.report(
            stage::TEMPLATE_RESEARCH,
            "Generating research using templates...",
        );
        let mut report =
            ResearchReport::new(format!("Template research for {}", context.project_name));
        for kind in Self::TEMPLATE_KINDS {
            report = report.with_section(ReportSection::new(
                kind.heading(),
                ReportTemplate::for_kind(kind, &context),
            ));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingDocuments, RecordingProgress, StaticWorkItems};

    #[tokio::test]
    async fn test_fills_templates_and_publishes_document() {
        let documents = Arc::new(RecordingDocuments::default());
        let executor = FastExecutor::new(Arc::new(StaticWorkItems), Arc::clone(&documents) as Arc<dyn DocumentSink>);
        let progress = RecordingProgress::default();

        let report = executor
            .execute(
                &ResearchRequest::new("42"),
                &progress,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.sections.len(), 3);
        assert_eq!(report.sections[0].heading, "Technical Research");
        assert!(report.document_url.is_some());

        // Document was attached to the originating story
        assert_eq!(documents.attachments(), vec!["42".to_string()]);
        assert!(progress.stages().contains(&stage::DOC_PUBLISH.to_string()));
    }
}
