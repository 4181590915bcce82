//! Types for the classification orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Ticket store error.
    #[error("ticket store error: {0}")]
    TicketStore(#[from] crate::ticket::TicketError),

    /// Classification error.
    #[error("classification error: {0}")]
    Classification(#[from] crate::classifier::ClassificationError),
}

/// Unit of work handed from producer to workers.
///
/// Carries only the id; workers re-read the ticket from the store, so the
/// data they see is whatever is current when the task is picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationTask {
    pub ticket_id: String,
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Whether the orchestrator is running.
    pub running: bool,
    /// Number of worker tasks.
    pub workers: usize,
    /// Tasks waiting in the queue.
    pub queued_tasks: usize,
    /// Tickets waiting for classification.
    pub pending_count: usize,
    /// Tickets currently being classified.
    pub processing_count: usize,
}
