//! Infrastructure layer for delve
//!
//! Adapters for the external collaborators: the Azure AI Agents REST
//! surface, the Azure DevOps work-item API, local document publication and
//! configuration loading.

pub mod config;
pub mod documents;
pub mod providers;
pub mod work_items;

pub use config::{AdoConfig, AzureConfig, ConfigLoader, DelveConfig};
pub use documents::LocalDocumentStore;
pub use providers::AzureAgentsGateway;
pub use work_items::AdoWorkItems;
