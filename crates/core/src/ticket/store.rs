//! Ticket storage trait and types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::{Category, Priority, Ticket, TicketStatus};

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Ticket not found.
    #[error("ticket not found: {0}")]
    NotFound(String),

    /// The requested lifecycle transition is not allowed.
    #[error("cannot move ticket {ticket_id} from {from:?} to {to:?}")]
    InvalidTransition {
        ticket_id: String,
        from: TicketStatus,
        to: TicketStatus,
    },

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Request to create a new ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketRequest {
    /// What the ticket is about.
    pub subject: String,
    /// Full problem description.
    pub description: String,
}

/// Filter for querying tickets.
#[derive(Debug, Clone)]
pub struct TicketFilter {
    /// Filter by lifecycle status.
    pub status: Option<TicketStatus>,
    /// Filter by assigned category.
    pub category: Option<Category>,
    /// Filter by assigned priority.
    pub priority: Option<Priority>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            status: None,
            category: None,
            priority: None,
            limit: 100,
            offset: 0,
        }
    }

    /// Filter by status.
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Filter by priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Aggregate ticket counts, broken down by status, category and priority.
///
/// Every known variant appears in the breakdowns, zero-filled, so the shape
/// of the response is stable regardless of the data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total_tickets: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_category: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
}

impl TicketStats {
    /// Empty stats with every variant zero-filled.
    pub fn empty() -> Self {
        let by_status = TicketStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let by_category = Category::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), 0))
            .collect();
        let by_priority = Priority::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();
        Self {
            total_tickets: 0,
            by_status,
            by_category,
            by_priority,
        }
    }
}

/// Trait for ticket storage backends.
pub trait TicketStore: Send + Sync {
    /// Create a new ticket in Pending status.
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError>;

    /// Get a ticket by ID.
    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError>;

    /// List tickets matching the filter, newest first.
    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError>;

    /// Count tickets matching the filter.
    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError>;

    /// Persist the given ticket, refreshing its `updated_at`.
    ///
    /// Returns the ticket as stored.
    fn update(&self, ticket: &Ticket) -> Result<Ticket, TicketError>;

    /// Aggregate counts across all tickets.
    fn stats(&self) -> Result<TicketStats, TicketError>;
}
