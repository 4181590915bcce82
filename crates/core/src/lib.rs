pub mod classifier;
pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod testing;
pub mod ticket;

pub use classifier::{
    parse_classification, ClassificationError, ClassificationResult, Classifier, GeminiClient,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, GeminiConfig,
    OrchestratorConfig, SanitizedConfig,
};
pub use orchestrator::{OrchestratorError, OrchestratorStatus, TriageOrchestrator};
pub use ticket::{
    Category, CreateTicketRequest, Priority, SqliteTicketStore, Ticket, TicketError, TicketFilter,
    TicketStats, TicketStatus, TicketStore,
};
