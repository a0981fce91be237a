//! AI provider adapters

pub mod azure_agents;

pub use azure_agents::AzureAgentsGateway;
