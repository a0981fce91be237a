//! Document publishing port

use async_trait::async_trait;
use delve_domain::FailureKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur rendering or attaching documents
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),

    /// Attaching the document to the work item failed upstream
    #[error("Failed to attach document: {0}")]
    Attach(String),
}

impl DocumentError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            DocumentError::Io(_) => FailureKind::Internal,
            DocumentError::Attach(_) => FailureKind::ExternalTransient,
        }
    }
}

/// A research report rendered for publication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub title: String,
    pub markdown: String,
}

/// Handle to a published document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub url: String,
}

/// Sink for publishing research documents and linking them to work items
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Persist the document and return a handle to it
    async fn publish(&self, document: &RenderedDocument) -> Result<DocumentHandle, DocumentError>;

    /// Link a published document to a work item
    async fn attach(&self, handle: &DocumentHandle, story_id: &str) -> Result<(), DocumentError>;
}
