//! Core ticket data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::store::TicketError;

/// Maximum length of a ticket subject.
pub const MAX_SUBJECT_LEN: usize = 500;

/// Maximum length of a ticket description.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Maximum length of a stored error message. Longer messages are truncated.
pub const MAX_ERROR_MESSAGE_LEN: usize = 1000;

/// Current status of a ticket.
///
/// State machine flow:
/// ```text
/// Pending -> Processing -> Classified
///                 |
///                 v
///              Failed
///
/// Classified and Failed are terminal - there is no retry transition.
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Just created, waiting for classification.
    Pending,
    /// Being classified by the AI provider.
    Processing,
    /// Successfully classified (terminal).
    Classified,
    /// Classification failed (terminal).
    Failed,
}

impl TicketStatus {
    /// All status variants, in lifecycle order.
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Pending,
        TicketStatus::Processing,
        TicketStatus::Classified,
        TicketStatus::Failed,
    ];

    /// Returns the status as its storage/wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "PENDING",
            TicketStatus::Processing => "PROCESSING",
            TicketStatus::Classified => "CLASSIFIED",
            TicketStatus::Failed => "FAILED",
        }
    }

    /// Parse a storage token back into a status.
    pub fn from_str_token(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(TicketStatus::Pending),
            "PROCESSING" => Some(TicketStatus::Processing),
            "CLASSIFIED" => Some(TicketStatus::Classified),
            "FAILED" => Some(TicketStatus::Failed),
            _ => None,
        }
    }

    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Classified | TicketStatus::Failed)
    }

    /// Returns true if the status may advance to `next`.
    ///
    /// The lifecycle is strictly monotonic: Pending -> Processing ->
    /// {Classified, Failed}. A Pending ticket may also fail directly (the
    /// consumer records failures that happen before the Processing write).
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Pending, TicketStatus::Processing)
                | (TicketStatus::Pending, TicketStatus::Failed)
                | (TicketStatus::Processing, TicketStatus::Classified)
                | (TicketStatus::Processing, TicketStatus::Failed)
        )
    }
}

/// Category assigned to a ticket by classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Billing,
    TechSupport,
    Bug,
    FeatureRequest,
    General,
}

impl Category {
    /// All category variants.
    pub const ALL: [Category; 5] = [
        Category::Billing,
        Category::TechSupport,
        Category::Bug,
        Category::FeatureRequest,
        Category::General,
    ];

    /// Returns the category as its storage/wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billing => "BILLING",
            Category::TechSupport => "TECH_SUPPORT",
            Category::Bug => "BUG",
            Category::FeatureRequest => "FEATURE_REQUEST",
            Category::General => "GENERAL",
        }
    }

    /// Parse a storage token back into a category.
    pub fn from_str_token(s: &str) -> Option<Self> {
        match s {
            "BILLING" => Some(Category::Billing),
            "TECH_SUPPORT" => Some(Category::TechSupport),
            "BUG" => Some(Category::Bug),
            "FEATURE_REQUEST" => Some(Category::FeatureRequest),
            "GENERAL" => Some(Category::General),
            _ => None,
        }
    }
}

/// Priority assigned to a ticket by classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// All priority variants, in ascending urgency.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Returns the priority as its storage/wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    /// Parse a storage token back into a priority.
    pub fn from_str_token(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Priority::Low),
            "MEDIUM" => Some(Priority::Medium),
            "HIGH" => Some(Priority::High),
            "URGENT" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

/// A customer support ticket tracked through the classification lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Unique identifier (UUID).
    pub id: String,

    /// What the ticket is about (<= 500 chars).
    pub subject: String,

    /// Full problem description (<= 5000 chars).
    pub description: String,

    /// Current lifecycle status.
    pub status: TicketStatus,

    /// Category, populated only once classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Priority, populated only once classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Sentiment on a 1-10 scale, populated only once classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<u8>,

    /// When the ticket was created. Immutable.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, refreshed on every store write.
    pub updated_at: DateTime<Utc>,

    /// Why classification failed. Set only on Failed, never cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Ticket {
    /// Advance the ticket to Processing.
    ///
    /// # Errors
    /// Returns [`TicketError::InvalidTransition`] if the ticket is not
    /// Pending.
    pub fn mark_processing(&mut self) -> Result<(), TicketError> {
        self.transition_to(TicketStatus::Processing)?;
        Ok(())
    }

    /// Record a successful classification and advance to Classified.
    ///
    /// Category, priority and sentiment are set together - they are
    /// all-or-nothing.
    ///
    /// # Errors
    /// Returns [`TicketError::InvalidTransition`] if the ticket is not
    /// Processing.
    pub fn mark_classified(
        &mut self,
        category: Category,
        priority: Priority,
        sentiment: u8,
    ) -> Result<(), TicketError> {
        self.transition_to(TicketStatus::Classified)?;
        self.category = Some(category);
        self.priority = Some(priority);
        self.sentiment = Some(sentiment);
        Ok(())
    }

    /// Record a classification failure and advance to Failed.
    ///
    /// The error message is truncated to [`MAX_ERROR_MESSAGE_LEN`] chars.
    /// Any previously set classification fields are left untouched.
    ///
    /// # Errors
    /// Returns [`TicketError::InvalidTransition`] if the ticket is already
    /// terminal.
    pub fn mark_failed(&mut self, message: &str) -> Result<(), TicketError> {
        self.transition_to(TicketStatus::Failed)?;
        self.error_message = Some(truncate_chars(message, MAX_ERROR_MESSAGE_LEN));
        Ok(())
    }

    fn transition_to(&mut self, next: TicketStatus) -> Result<(), TicketError> {
        if !self.status.can_transition_to(next) {
            return Err(TicketError::InvalidTransition {
                ticket_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Truncate a string to at most `max` characters, on a char boundary.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
