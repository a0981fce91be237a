//! Azure AI Agents REST adapter
//!
//! Implements the `AgentGateway` port over the agents API: create an agent,
//! open a thread, post the prompt, start a run, poll it to completion and
//! read the last assistant message. Deep research attaches the grounded
//! deep-research tool and additionally collects URL citations.
//!
//! Credential acquisition is out of scope; the gateway is handed a bearer
//! token at construction.

use crate::config::AzureConfig;
use async_trait::async_trait;
use delve_application::ports::agent_gateway::{
    AgentGateway, Citation, GatewayError, GroundedAnswer,
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const API_VERSION: &str = "2025-05-01";

pub struct AzureAgentsGateway {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    model_deployment: String,
    deep_research_model: String,
    grounding_connection: String,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
struct AgentResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ThreadResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ConnectionResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunResource {
    id: String,
    status: String,
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageResource>,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    role: String,
    content: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    kind: String,
    text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
    #[serde(default)]
    annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
struct Annotation {
    url_citation: Option<UrlCitation>,
}

#[derive(Debug, Deserialize)]
struct UrlCitation {
    url: String,
    title: Option<String>,
}

impl AzureAgentsGateway {
    pub fn new(config: &AzureConfig, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.project_endpoint.trim_end_matches('/').to_string(),
            token: token.into(),
            model_deployment: config.model_deployment.clone(),
            deep_research_model: config.deep_research_model.clone(),
            grounding_connection: config.grounding_connection.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}?api-version={}", self.endpoint, path, API_VERSION)
    }

    async fn post(&self, path: &str, body: Value) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Self::check_status(response).await
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Self::check_status(response).await
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, &body))
    }

    async fn create_agent(&self, instructions: &str, tools: Value) -> Result<String, GatewayError> {
        let agent: AgentResource = self
            .post(
                "assistants",
                json!({
                    "model": self.model_deployment,
                    "name": "delve-research-agent",
                    "instructions": instructions,
                    "tools": tools,
                }),
            )
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(agent.id)
    }

    async fn delete_agent(&self, agent_id: &str) {
        let result = self
            .client
            .delete(self.url(&format!("assistants/{agent_id}")))
            .bearer_auth(&self.token)
            .send()
            .await;
        if let Err(e) = result {
            // Leaked agents are cleaned up server-side eventually
            debug!(agent = agent_id, error = %e, "agent cleanup failed");
        }
    }

    async fn resolve_connection_id(&self, name: &str) -> Result<String, GatewayError> {
        let connection: ConnectionResource = self
            .get(&format!("connections/{name}"))
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(connection.id)
    }

    /// Run a prompt on a fresh agent/thread and return the final message
    async fn run_to_completion(
        &self,
        agent_id: &str,
        prompt: &str,
    ) -> Result<MessageResource, GatewayError> {
        let thread: ThreadResource = self
            .post("threads", json!({}))
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.post(
            &format!("threads/{}/messages", thread.id),
            json!({ "role": "user", "content": prompt }),
        )
        .await?;

        let mut run: RunResource = self
            .post(
                &format!("threads/{}/runs", thread.id),
                json!({ "assistant_id": agent_id }),
            )
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        while matches!(run.status.as_str(), "queued" | "in_progress") {
            tokio::time::sleep(self.poll_interval).await;
            run = self
                .get(&format!("threads/{}/runs/{}", thread.id, run.id))
                .await?
                .json()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            debug!(thread = %thread.id, run = %run.id, status = %run.status, "run polled");
        }

        if run.status == "failed" {
            let message = run
                .last_error
                .map(|e| e.message)
                .unwrap_or_else(|| "run failed without detail".to_string());
            warn!(thread = %thread.id, %message, "agent run failed");
            return Err(GatewayError::Server(message));
        }

        let messages: MessageList = self
            .get(&format!("threads/{}/messages", thread.id))
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        last_assistant_message(messages).ok_or_else(|| {
            GatewayError::Server("no assistant message returned from run".to_string())
        })
    }
}

#[async_trait]
impl AgentGateway for AzureAgentsGateway {
    async fn call(&self, instructions: &str, input: &str) -> Result<String, GatewayError> {
        let agent_id = self.create_agent(instructions, json!([])).await?;
        let result = self.run_to_completion(&agent_id, input).await;
        self.delete_agent(&agent_id).await;
        result.map(|message| extract_text(&message))
    }

    async fn deep_research(&self, prompt: &str) -> Result<GroundedAnswer, GatewayError> {
        let connection_id = self
            .resolve_connection_id(&self.grounding_connection)
            .await?;
        let tools = json!([{
            "type": "deep_research",
            "deep_research": {
                "model": self.deep_research_model,
                "bing_grounding_connections": [{ "connection_id": connection_id }],
            },
        }]);

        let agent_id = self
            .create_agent(
                "You are an expert research analyst. Provide comprehensive, detailed analysis \
                 with citations and specific recommendations. Use the deep research tool to \
                 gather current information from multiple sources.",
                tools,
            )
            .await?;
        let result = self.run_to_completion(&agent_id, prompt).await;
        self.delete_agent(&agent_id).await;

        let message = result?;
        Ok(GroundedAnswer {
            text: extract_text(&message),
            citations: extract_citations(&message),
        })
    }
}

fn classify_status(status: StatusCode, body: &str) -> GatewayError {
    let detail = format!("{status}: {body}");
    if status.is_server_error() {
        GatewayError::Server(detail)
    } else {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Auth(detail),
            StatusCode::NOT_FOUND => GatewayError::NotFound(detail),
            _ => GatewayError::InvalidRequest(detail),
        }
    }
}

/// Newest assistant message (the API returns newest-first)
fn last_assistant_message(messages: MessageList) -> Option<MessageResource> {
    messages.data.into_iter().find(|m| m.role == "assistant")
}

fn extract_text(message: &MessageResource) -> String {
    message
        .content
        .iter()
        .filter(|item| item.kind == "text")
        .filter_map(|item| item.text.as_ref())
        .map(|text| text.value.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn extract_citations(message: &MessageResource) -> Vec<Citation> {
    message
        .content
        .iter()
        .filter_map(|item| item.text.as_ref())
        .flat_map(|text| text.annotations.iter())
        .filter_map(|annotation| annotation.url_citation.as_ref())
        .map(|citation| Citation {
            title: citation
                .title
                .clone()
                .unwrap_or_else(|| citation.url.clone()),
            url: citation.url.clone(),
        })
        .collect()
}
