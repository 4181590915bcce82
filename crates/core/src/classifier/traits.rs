//! Classifier trait.

use async_trait::async_trait;

use crate::classifier::{ClassificationError, ClassificationResult};

/// Trait for ticket classification backends.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Provider name (e.g., "gemini").
    fn provider(&self) -> &str;

    /// Model name (e.g., "gemini-1.5-flash").
    fn model(&self) -> &str;

    /// Classify a ticket from its subject and description.
    async fn classify(
        &self,
        subject: &str,
        description: &str,
    ) -> Result<ClassificationResult, ClassificationError>;
}
