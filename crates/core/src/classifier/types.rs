//! Classification result and error types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ticket::{Category, Priority};

/// Error type for classification operations.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),
}

/// Outcome of classifying a ticket.
///
/// Always fully populated: the response parser substitutes defaults for
/// anything the model failed to state, so there is no partial result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationResult {
    pub category: Category,
    pub priority: Priority,
    /// Sentiment on a 1-10 scale (1 = very negative, 10 = very positive).
    pub sentiment: u8,
    /// Model's brief explanation, when it gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}
