//! Configuration: file + environment merging

mod file_config;
mod loader;

pub use file_config::{AdoConfig, AzureConfig, DelveConfig, DocumentsConfig, ResearchConfig};
pub use loader::ConfigLoader;
