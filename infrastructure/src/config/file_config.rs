//! Configuration schema

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the delve service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DelveConfig {
    pub azure: AzureConfig,
    pub ado: AdoConfig,
    pub documents: DocumentsConfig,
    pub research: ResearchConfig,
}

/// Azure AI Agents connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// AI project endpoint, e.g. https://example.services.ai.azure.com/api/projects/p
    pub project_endpoint: String,
    /// Model deployment backing the research agents
    pub model_deployment: String,
    /// Model deployment used for grounded deep research
    pub deep_research_model: String,
    /// Name of the grounding (Bing) connection resolved at startup
    pub grounding_connection: String,
    /// Environment variable holding the bearer token
    pub token_env: String,
    /// Run polling interval in seconds
    pub poll_interval_secs: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            project_endpoint: String::new(),
            model_deployment: "gpt-4o".to_string(),
            deep_research_model: "o3-deep-research".to_string(),
            grounding_connection: String::new(),
            token_env: "AZURE_AI_TOKEN".to_string(),
            poll_interval_secs: 30,
        }
    }
}

/// Azure DevOps work-item tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdoConfig {
    pub organization: String,
    pub project: String,
    /// Environment variable holding the personal access token
    pub pat_env: String,
    pub api_version: String,
}

impl Default for AdoConfig {
    fn default() -> Self {
        Self {
            organization: String::new(),
            project: String::new(),
            pat_env: "ADO_PAT".to_string(),
            api_version: "7.1-preview.3".to_string(),
        }
    }
}

/// Document publication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub output_dir: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("research-reports"),
        }
    }
}

/// Research execution tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Deadline for a grounded deep-research run, in seconds
    pub deep_timeout_secs: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            deep_timeout_secs: 45 * 60,
        }
    }
}

impl ResearchConfig {
    pub fn deep_timeout(&self) -> Duration {
        Duration::from_secs(self.deep_timeout_secs)
    }
}
