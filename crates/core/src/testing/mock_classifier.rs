//! Mock classifier for testing.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::classifier::{ClassificationError, ClassificationResult, Classifier};
use crate::ticket::{Category, Priority};

/// Mock implementation of the Classifier trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable classification result
/// - Queue errors to be returned on subsequent calls
/// - Simulate latency
/// - Record calls for assertions
///
/// # Example
///
/// ```rust,ignore
/// use triage_core::testing::MockClassifier;
///
/// let classifier = MockClassifier::returning(fixtures::bug_high());
/// // ... drive the orchestrator ...
/// assert_eq!(classifier.call_count(), 1);
/// ```
pub struct MockClassifier {
    result: Mutex<ClassificationResult>,
    /// Errors returned ahead of the configured result, one per call.
    queued_errors: Mutex<VecDeque<ClassificationError>>,
    /// Recorded (subject, description) pairs.
    calls: Mutex<Vec<(String, String)>>,
    delay: Mutex<Option<Duration>>,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    /// Create a mock returning a neutral default result.
    pub fn new() -> Self {
        Self::returning(ClassificationResult {
            category: Category::General,
            priority: Priority::Medium,
            sentiment: 5,
            reasoning: None,
        })
    }

    /// Create a mock that always returns the given result.
    pub fn returning(result: ClassificationResult) -> Self {
        Self {
            result: Mutex::new(result),
            queued_errors: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }

    /// Create a mock whose first call fails with the given error.
    pub fn failing(error: ClassificationError) -> Self {
        let mock = Self::new();
        mock.queue_error(error);
        mock
    }

    /// Replace the configured result.
    pub fn set_result(&self, result: ClassificationResult) {
        *self.result.lock().unwrap() = result;
    }

    /// Queue an error; each queued error is consumed by one call before the
    /// configured result is returned again.
    pub fn queue_error(&self, error: ClassificationError) {
        self.queued_errors.lock().unwrap().push_back(error);
    }

    /// Delay every call by the given duration.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Recorded (subject, description) pairs, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of classify calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn classify(
        &self,
        subject: &str,
        description: &str,
    ) -> Result<ClassificationResult, ClassificationError> {
        self.calls
            .lock()
            .unwrap()
            .push((subject.to_string(), description.to_string()));

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.queued_errors.lock().unwrap().pop_front() {
            return Err(error);
        }

        Ok(self.result.lock().unwrap().clone())
    }
}
