//! Ticket system for tracking support requests through classification.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteTicketStore;
pub use store::{CreateTicketRequest, TicketError, TicketFilter, TicketStats, TicketStore};
pub use types::{
    Category, Priority, Ticket, TicketStatus, MAX_DESCRIPTION_LEN, MAX_ERROR_MESSAGE_LEN,
    MAX_SUBJECT_LEN,
};
