//! Application layer for delve
//!
//! This crate contains the job store, the port definitions for external
//! collaborators, the strategy executors and the orchestrating research
//! service. It depends only on the domain layer.

pub mod ports;
pub mod store;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use ports::{
    agent_gateway::{AgentGateway, Citation, GatewayError, GroundedAnswer},
    documents::{DocumentError, DocumentHandle, DocumentSink, RenderedDocument},
    progress::{NoProgress, ProgressReporter},
    work_items::{StorySummary, WorkItemError, WorkItemGateway},
};
pub use store::{JobFilter, JobStore, StoreError};
pub use use_cases::{
    CancelOutcome, DeepExecutor, DeepResearchSettings, ExecutorError, FastExecutor,
    ResearchService, ResearchServiceBuilder, ServiceError, SimpleExecutor, StrategyExecutor,
    StructuredExecutor,
};
