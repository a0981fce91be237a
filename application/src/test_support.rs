//! Fake port implementations shared by executor and orchestrator tests.

use crate::ports::agent_gateway::{AgentGateway, Citation, GatewayError, GroundedAnswer};
use crate::ports::documents::{DocumentError, DocumentHandle, DocumentSink, RenderedDocument};
use crate::ports::progress::ProgressReporter;
use crate::ports::work_items::{StorySummary, WorkItemError, WorkItemGateway};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Work-item gateway returning one canned story for any id
pub(crate) struct StaticWorkItems;

#[async_trait]
impl WorkItemGateway for StaticWorkItems {
    async fn fetch_story(&self, story_id: &str) -> Result<StorySummary, WorkItemError> {
        let summary_markdown = format!(
            "**Story {story_id}: Partner Portal Copilot**\n\
             - **State:** Active\n\
             - **Description:**\nBuild a partner management portal."
        );
        Ok(StorySummary {
            id: story_id.to_string(),
            title: "Partner Portal Copilot".to_string(),
            state: "Active".to_string(),
            assigned_to: "Unassigned".to_string(),
            description: "Build a partner management portal.".to_string(),
            summary_markdown,
        })
    }
}

/// Work-item gateway that knows no stories
pub(crate) struct MissingWorkItems;

#[async_trait]
impl WorkItemGateway for MissingWorkItems {
    async fn fetch_story(&self, story_id: &str) -> Result<StorySummary, WorkItemError> {
        Err(WorkItemError::NotFound(story_id.to_string()))
    }
}

/// Agent gateway with a scripted answer, optional latency, citations and a
/// token to cancel after each call (for checkpoint tests)
pub(crate) struct ScriptedAgent {
    text: String,
    delay: Duration,
    citations: Vec<Citation>,
    cancel_after_call: Option<CancellationToken>,
}

impl ScriptedAgent {
    pub(crate) fn answering(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delay: Duration::ZERO,
            citations: Vec::new(),
            cancel_after_call: None,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn with_citation(mut self, title: &str, url: &str) -> Self {
        self.citations.push(Citation {
            title: title.to_string(),
            url: url.to_string(),
        });
        self
    }

    pub(crate) fn cancelling_after_call(mut self, token: CancellationToken) -> Self {
        self.cancel_after_call = Some(token);
        self
    }

    async fn settle(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(token) = &self.cancel_after_call {
            token.cancel();
        }
    }
}

#[async_trait]
impl AgentGateway for ScriptedAgent {
    async fn call(&self, _instructions: &str, _input: &str) -> Result<String, GatewayError> {
        self.settle().await;
        Ok(self.text.clone())
    }

    async fn deep_research(&self, _prompt: &str) -> Result<GroundedAnswer, GatewayError> {
        self.settle().await;
        Ok(GroundedAnswer {
            text: self.text.clone(),
            citations: self.citations.clone(),
        })
    }
}

/// Agent gateway that always fails with the scripted error
pub(crate) struct FailingAgent {
    make_error: Box<dyn Fn() -> GatewayError + Send + Sync>,
}

impl FailingAgent {
    pub(crate) fn new(make_error: impl Fn() -> GatewayError + Send + Sync + 'static) -> Self {
        Self {
            make_error: Box::new(make_error),
        }
    }
}

#[async_trait]
impl AgentGateway for FailingAgent {
    async fn call(&self, _instructions: &str, _input: &str) -> Result<String, GatewayError> {
        Err((self.make_error)())
    }

    async fn deep_research(&self, _prompt: &str) -> Result<GroundedAnswer, GatewayError> {
        Err((self.make_error)())
    }
}

/// Agent gateway that blocks until released, simulating a long external call
pub(crate) struct BlockedAgent {
    pub(crate) release: Arc<Notify>,
}

impl BlockedAgent {
    pub(crate) fn new() -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        (
            Self {
                release: Arc::clone(&release),
            },
            release,
        )
    }
}

#[async_trait]
impl AgentGateway for BlockedAgent {
    async fn call(&self, _instructions: &str, _input: &str) -> Result<String, GatewayError> {
        self.release.notified().await;
        Ok("late result".to_string())
    }

    async fn deep_research(&self, _prompt: &str) -> Result<GroundedAnswer, GatewayError> {
        self.release.notified().await;
        Ok(GroundedAnswer {
            text: "late result".to_string(),
            citations: Vec::new(),
        })
    }
}

/// Document sink recording which stories documents were attached to
#[derive(Default)]
pub(crate) struct RecordingDocuments {
    attached: Mutex<Vec<String>>,
}

impl RecordingDocuments {
    pub(crate) fn attachments(&self) -> Vec<String> {
        self.attached.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSink for RecordingDocuments {
    async fn publish(&self, document: &RenderedDocument) -> Result<DocumentHandle, DocumentError> {
        Ok(DocumentHandle {
            url: format!("file:///reports/{}.md", document.title.replace(' ', "_")),
        })
    }

    async fn attach(&self, _handle: &DocumentHandle, story_id: &str) -> Result<(), DocumentError> {
        self.attached.lock().unwrap().push(story_id.to_string());
        Ok(())
    }
}

/// Progress reporter recording every milestone
#[derive(Default)]
pub(crate) struct RecordingProgress {
    notes: Mutex<Vec<(String, String)>>,
}

impl RecordingProgress {
    pub(crate) fn stages(&self) -> Vec<String> {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .map(|(stage, _)| stage.clone())
            .collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, stage: &str, message: &str) {
        self.notes
            .lock()
            .unwrap()
            .push((stage.to_string(), message.to_string()));
    }
}
