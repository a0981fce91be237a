//! Azure DevOps work-item adapter
//!
//! Fetches user stories through the ADO REST API and renders them into the
//! markdown summary the prompt layer consumes. HTML in field values is
//! stripped before rendering.

use crate::config::AdoConfig;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use delve_application::ports::work_items::{StorySummary, WorkItemError, WorkItemGateway};
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

pub struct AdoWorkItems {
    client: reqwest::Client,
    organization: String,
    project: String,
    auth_header: String,
    api_version: String,
    tag_pattern: Regex,
}

impl AdoWorkItems {
    pub fn new(config: &AdoConfig, pat: &str) -> Self {
        // ADO basic auth takes an empty username with the PAT as password
        let auth_header = format!("Basic {}", STANDARD.encode(format!(":{pat}")));
        Self {
            client: reqwest::Client::new(),
            organization: config.organization.clone(),
            project: config.project.clone(),
            auth_header,
            api_version: config.api_version.clone(),
            tag_pattern: Regex::new(r"<[^>]+>").expect("static pattern compiles"),
        }
    }

    fn work_item_url(&self, story_id: &str) -> String {
        format!(
            "https://dev.azure.com/{}/{}/_apis/wit/workitems/{}?api-version={}",
            self.organization, self.project, story_id, self.api_version
        )
    }

    fn comment_url(&self, story_id: &str) -> String {
        format!(
            "https://dev.azure.com/{}/{}/_apis/wit/workItems/{}/comments?api-version={}",
            self.organization, self.project, story_id, self.api_version
        )
    }

    fn strip_html(&self, value: &str) -> String {
        let text = self.tag_pattern.replace_all(value, " ");
        unescape_entities(&text)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Add a comment to a work item. Used to link published documents back
    /// to the story they were researched for.
    pub async fn add_comment(&self, story_id: &str, text: &str) -> Result<(), WorkItemError> {
        let response = self
            .client
            .post(self.comment_url(story_id))
            .header("Authorization", &self.auth_header)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| WorkItemError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(story = story_id, "comment added to work item");
            return Ok(());
        }
        Err(classify_status(status, story_id))
    }
}

#[async_trait]
impl WorkItemGateway for AdoWorkItems {
    async fn fetch_story(&self, story_id: &str) -> Result<StorySummary, WorkItemError> {
        let response = self
            .client
            .get(self.work_item_url(story_id))
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| WorkItemError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, story_id));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WorkItemError::Request(e.to_string()))?;

        let fields = body
            .get("fields")
            .ok_or_else(|| WorkItemError::Request("work item has no fields".to_string()))?;

        let title = field_str(fields, "System.Title");
        let state = field_str(fields, "System.State");
        let assigned_to = fields
            .get("System.AssignedTo")
            .and_then(|v| v.get("displayName"))
            .and_then(Value::as_str)
            .unwrap_or("Unassigned")
            .to_string();
        let description = self.strip_html(&field_str(fields, "System.Description"));
        let acceptance =
            self.strip_html(&field_str(fields, "Microsoft.VSTS.Common.AcceptanceCriteria"));

        let summary_markdown =
            render_summary(story_id, &title, &state, &assigned_to, &description, &acceptance);

        Ok(StorySummary {
            id: story_id.to_string(),
            title,
            state,
            assigned_to,
            description,
            summary_markdown,
        })
    }
}

fn classify_status(status: StatusCode, story_id: &str) -> WorkItemError {
    if status.is_server_error() {
        return WorkItemError::Unavailable(format!("{status} fetching story {story_id}"));
    }
    match status {
        StatusCode::NOT_FOUND => WorkItemError::NotFound(story_id.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            WorkItemError::Auth(format!("{status} fetching story {story_id}"))
        }
        _ => WorkItemError::Request(format!("{status} fetching story {story_id}")),
    }
}

fn field_str(fields: &Value, name: &str) -> String {
    fields
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn render_summary(
    id: &str,
    title: &str,
    state: &str,
    assigned_to: &str,
    description: &str,
    acceptance: &str,
) -> String {
    let mut summary = format!(
        "**Story {id}: {title}**\n- **State:** {state}\n- **Assigned To:** {assigned_to}\n"
    );
    if !acceptance.is_empty() {
        summary.push_str(&format!("- **Acceptance Criteria:** {acceptance}\n"));
    }
    // Description last: context extraction reads everything after the marker
    if !description.is_empty() {
        summary.push_str(&format!("- **Description:**\n{description}\n"));
    }
    summary
}

fn unescape_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
