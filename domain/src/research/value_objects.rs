//! Research job value objects

use crate::research::strategy::ResearchKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque job identifier, assigned once at creation and never reused
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A research request: the work item to research and optional parameters
///
/// Immutable once the job record is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    /// Work item (user story) identifier the research is anchored to
    pub story_id: String,
    /// Custom research instructions (used by the deep strategy)
    pub custom_prompt: Option<String>,
    /// Research types to produce (structured strategies)
    pub research_types: Vec<ResearchKind>,
}

impl ResearchRequest {
    pub fn new(story_id: impl Into<String>) -> Self {
        Self {
            story_id: story_id.into(),
            custom_prompt: None,
            research_types: Vec::new(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    pub fn with_research_types(mut self, types: Vec<ResearchKind>) -> Self {
        self.research_types = types;
        self
    }
}

/// One titled section of a research report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub heading: String,
    pub body: String,
}

impl ReportSection {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }
}

/// The artifact produced by a completed research job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Short summary of what was produced
    pub summary: String,
    /// Report body, one section per research type or sub-step
    pub sections: Vec<ReportSection>,
    /// Location of the published document, when one was generated
    pub document_url: Option<String>,
}

impl ResearchReport {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            sections: Vec::new(),
            document_url: None,
        }
    }

    pub fn with_section(mut self, section: ReportSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_document_url(mut self, url: impl Into<String>) -> Self {
        self.document_url = Some(url.into());
        self
    }

    /// Render the report as a single markdown document
    pub fn to_markdown(&self) -> String {
        let mut doc = String::new();
        for section in &self.sections {
            doc.push_str(&format!("# {}\n\n{}\n\n", section.heading, section.body));
        }
        doc
    }
}

/// Classification of a job failure, kept distinct so a caller can decide
/// whether resubmission is worthwhile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A collaborator failed with a retriable, server-side condition
    ExternalTransient,
    /// A collaborator failed with a non-retriable condition
    ExternalPermanent,
    /// A strategy-enforced deadline elapsed before the external call returned
    Timeout,
    /// A failure inside the executor itself
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ExternalTransient => "external_transient",
            FailureKind::ExternalPermanent => "external_permanent",
            FailureKind::Timeout => "timeout",
            FailureKind::Internal => "internal",
        }
    }

    /// Whether resubmitting the same request may succeed
    pub fn is_retriable(&self) -> bool {
        matches!(self, FailureKind::ExternalTransient | FailureKind::Timeout)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded job failure: what kind, at which executor stage, and why
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: FailureKind,
    /// Executor stage the failure originated from (e.g. "story_fetch")
    pub stage: String,
    pub message: String,
}

impl JobFailure {
    pub fn new(kind: FailureKind, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.stage, self.message)
    }
}

/// One timestamped progress milestone surfaced by a running executor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressNote {
    pub at: DateTime<Utc>,
    pub stage: String,
    pub message: String,
}

impl ProgressNote {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            stage: stage.into(),
            message: message.into(),
        }
    }
}
