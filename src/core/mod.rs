//! Display orchestration: the tick loop and its control surface

mod control;
mod orchestrator;

pub use control::{Command, OrchestratorHandle};
pub use orchestrator::{DisplayOrchestrator, OrchestratorConfig, OrchestratorError, TickReport};
