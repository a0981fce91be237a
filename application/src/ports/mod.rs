//! Port definitions (interfaces to external collaborators)
//!
//! Ports are implemented by adapters in the infrastructure layer and by
//! fakes in tests. Executors and the orchestrator depend only on these
//! traits, never on concrete adapters.

pub mod agent_gateway;
pub mod documents;
pub mod progress;
pub mod work_items;

pub use agent_gateway::{AgentGateway, Citation, GatewayError, GroundedAnswer};
pub use documents::{DocumentError, DocumentHandle, DocumentSink, RenderedDocument};
pub use progress::{NoProgress, ProgressReporter};
pub use work_items::{StorySummary, WorkItemError, WorkItemGateway};
