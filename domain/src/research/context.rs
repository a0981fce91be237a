//! Project context extracted from a work-item summary
//!
//! Work-item summaries arrive as markdown in the shape
//! `**Story 42: Title**` followed by `- **Field:** value` lines. The
//! extraction is deliberately forgiving: missing fields fall back to a
//! generic context so research can still proceed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    pub project_name: String,
    pub project_context: String,
    pub story_id: String,
}

impl ProjectContext {
    /// Parse a work-item summary into project context
    pub fn from_story_summary(summary: &str, story_id: &str) -> Self {
        let mut title = "Unknown Project".to_string();
        for line in summary.lines() {
            if line.starts_with("**Story")
                && let Some((_, rest)) = line.split_once(':')
            {
                title = rest.trim().trim_end_matches('*').trim().to_string();
                break;
            }
        }

        let mut description = String::new();
        let mut in_description = false;
        for line in summary.lines() {
            if line.contains("**Description:**") {
                in_description = true;
                continue;
            }
            if in_description {
                description.push_str(line);
                description.push(' ');
            }
        }

        let description = description.trim().to_string();
        Self {
            project_name: title,
            project_context: if description.is_empty() {
                format!("Azure DevOps Story {}", story_id)
            } else {
                description
            },
            story_id: story_id.to_string(),
        }
    }
}
