use std::sync::Arc;
use triage_core::{Config, SanitizedConfig, TicketStore, TriageOrchestrator};

/// Shared application state
pub struct AppState {
    config: Config,
    ticket_store: Arc<dyn TicketStore>,
    orchestrator: Arc<TriageOrchestrator>,
}

impl AppState {
    pub fn new(
        config: Config,
        ticket_store: Arc<dyn TicketStore>,
        orchestrator: Arc<TriageOrchestrator>,
    ) -> Self {
        Self {
            config,
            ticket_store,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn ticket_store(&self) -> &dyn TicketStore {
        self.ticket_store.as_ref()
    }

    pub fn orchestrator(&self) -> &TriageOrchestrator {
        self.orchestrator.as_ref()
    }
}
