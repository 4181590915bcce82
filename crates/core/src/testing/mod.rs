//! Testing utilities and mock implementations.
//!
//! Provides a mock classifier so the orchestrator and HTTP surface can be
//! exercised end to end without calling a real model provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use triage_core::testing::{fixtures, MockClassifier};
//!
//! let classifier = MockClassifier::returning(fixtures::billing_urgent());
//! // Use in TriageOrchestrator...
//! ```

mod mock_classifier;

pub use mock_classifier::MockClassifier;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::classifier::ClassificationResult;
    use crate::ticket::{Category, Priority};

    /// A high-priority bug classification.
    pub fn bug_high() -> ClassificationResult {
        ClassificationResult {
            category: Category::Bug,
            priority: Priority::High,
            sentiment: 3,
            reasoning: Some("Reported behavior points at a product defect".to_string()),
        }
    }

    /// An urgent billing classification from an upset customer.
    pub fn billing_urgent() -> ClassificationResult {
        ClassificationResult {
            category: Category::Billing,
            priority: Priority::Urgent,
            sentiment: 1,
            reasoning: Some("Customer was charged twice and threatens to leave".to_string()),
        }
    }

    /// A neutral general classification, matching the parser's defaults.
    pub fn general_medium() -> ClassificationResult {
        ClassificationResult {
            category: Category::General,
            priority: Priority::Medium,
            sentiment: 5,
            reasoning: None,
        }
    }

    /// A well-formed raw model response matching `bug_high`.
    pub fn raw_bug_response() -> &'static str {
        "CATEGORY: BUG\nPRIORITY: HIGH\nSENTIMENT: 3\nREASONING: Reported behavior points at a product defect"
    }

    /// A raw model response with chatty prose around the labeled lines.
    pub fn raw_chatty_response() -> &'static str {
        "Here is my analysis of the ticket.\n\nCATEGORY: FEATURE_REQUEST\nPRIORITY: LOW\nSENTIMENT: 8\nREASONING: Polite suggestion for a new export format."
    }

    /// A raw model response that ignores the requested format entirely.
    pub fn raw_unusable_response() -> &'static str {
        "I'm sorry, I can't help with classifying this ticket."
    }
}
