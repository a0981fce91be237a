//! Prompt and report templates

pub mod template;

pub use template::{ReportTemplate, ResearchPrompt};
