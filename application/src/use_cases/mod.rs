//! Use cases: the orchestrator and the strategy executors

pub mod executors;
pub mod research_service;

pub use executors::{
    DeepExecutor, DeepResearchSettings, ExecutorError, FastExecutor, SimpleExecutor,
    StrategyExecutor, StructuredExecutor,
};
pub use research_service::{
    CancelOutcome, ResearchService, ResearchServiceBuilder, ServiceError,
};
