//! Work-item tracking port

use async_trait::async_trait;
use delve_domain::FailureKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur fetching work items
#[derive(Error, Debug)]
pub enum WorkItemError {
    #[error("Work item not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request failed: {0}")]
    Request(String),

    /// The tracking service is unavailable; retriable
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl WorkItemError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            WorkItemError::Unavailable(_) => FailureKind::ExternalTransient,
            _ => FailureKind::ExternalPermanent,
        }
    }
}

/// Structured fields of a fetched user story
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySummary {
    pub id: String,
    pub title: String,
    pub state: String,
    pub assigned_to: String,
    pub description: String,
    /// Pre-rendered markdown summary, the form executors feed to prompts
    pub summary_markdown: String,
}

/// Gateway for the work-item tracking collaborator
#[async_trait]
pub trait WorkItemGateway: Send + Sync {
    async fn fetch_story(&self, story_id: &str) -> Result<StorySummary, WorkItemError>;
}
