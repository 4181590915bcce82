//! Background classification pipeline.

mod runner;
mod types;

pub use runner::TriageOrchestrator;
pub use types::{ClassificationTask, OrchestratorError, OrchestratorStatus};
