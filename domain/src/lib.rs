//! Domain layer for delve
//!
//! This crate contains the core research-job model: strategies, the job
//! status state machine, value objects, and the prompt/report templates.
//! It has no dependencies on infrastructure or presentation concerns.

pub mod core;
pub mod prompt;
pub mod research;

// Re-export commonly used types
pub use crate::core::error::DomainError;
pub use prompt::{ReportTemplate, ResearchPrompt};
pub use research::{
    context::ProjectContext,
    entities::{JobStatus, ResearchJob},
    strategy::{ResearchKind, ResearchStrategy},
    value_objects::{
        FailureKind, JobFailure, JobId, ProgressNote, ReportSection, ResearchReport,
        ResearchRequest,
    },
};
