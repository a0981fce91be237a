//! AI agent gateway port
//!
//! Defines how executors talk to the AI collaborator. The deep-research
//! entry point is separate from the plain call because it runs against a
//! grounded, long-running agent run with its own configuration.

use async_trait::async_trait;
use delve_domain::FailureKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during agent gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Server-side failure; the same request may succeed on retry
    #[error("Server error: {0}")]
    Server(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Map the gateway error onto the job failure taxonomy
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            GatewayError::Server(_) | GatewayError::Transport(_) => FailureKind::ExternalTransient,
            GatewayError::Timeout => FailureKind::Timeout,
            GatewayError::Auth(_) | GatewayError::NotFound(_) | GatewayError::InvalidRequest(_) => {
                FailureKind::ExternalPermanent
            }
        }
    }
}

/// A URL citation attached to a grounded answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

/// Result of a grounded deep-research run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedAnswer {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl GroundedAnswer {
    /// Render the answer with a deduplicated references section appended
    pub fn to_markdown(&self) -> String {
        let mut out = self.text.clone();
        if !self.citations.is_empty() {
            out.push_str("\n\n## References and Citations\n");
            let mut seen = std::collections::HashSet::new();
            for citation in &self.citations {
                if seen.insert(citation.url.as_str()) {
                    out.push_str(&format!("- [{}]({})\n", citation.title, citation.url));
                }
            }
        }
        out
    }
}

/// Gateway for AI agent calls
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// One request/response round trip against an agent
    async fn call(&self, instructions: &str, input: &str) -> Result<String, GatewayError>;

    /// Long-running grounded research run; may take tens of minutes
    async fn deep_research(&self, prompt: &str) -> Result<GroundedAnswer, GatewayError>;
}
