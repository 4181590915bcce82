//! Gemini generateContent client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::parser::parse_classification;
use crate::classifier::{ClassificationError, ClassificationResult, Classifier};
use crate::config::GeminiConfig;

const CLASSIFICATION_PROMPT: &str = "\
Analyze the following customer support ticket and provide classification:

Subject: {subject}
Description: {description}

Please classify this ticket with the following information:
1. Category: Choose ONE from [BILLING, TECH_SUPPORT, BUG, FEATURE_REQUEST, GENERAL]
2. Priority: Choose ONE from [LOW, MEDIUM, HIGH, URGENT]
3. Sentiment: Rate from 1-10 (1=very negative, 10=very positive)

Respond ONLY in this exact format:
CATEGORY: <category>
PRIORITY: <priority>
SENTIMENT: <number>
REASONING: <brief explanation>
";

/// Build the classification prompt for a ticket.
fn build_prompt(subject: &str, description: &str) -> String {
    CLASSIFICATION_PROMPT
        .replace("{subject}", subject)
        .replace("{description}", description)
}

/// Gemini API client using the generateContent REST endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client from its configuration.
    ///
    /// # Errors
    /// Returns [`ClassificationError::Http`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: GeminiConfig) -> Result<Self, ClassificationError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ClassificationError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiResponse {
    /// Extract the first candidate's first text part.
    fn into_text(self) -> Result<String, ClassificationError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                ClassificationError::MalformedResponse(
                    "no candidates with text content".to_string(),
                )
            })
    }
}

#[async_trait]
impl Classifier for GeminiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn classify(
        &self,
        subject: &str,
        description: &str,
    ) -> Result<ClassificationResult, ClassificationError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(subject, description),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint_url())
            .query(&[("key", self.config.api_key.as_str())])
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassificationError::Timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    ClassificationError::Http(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(ClassificationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;

        let text = gemini_response.into_text()?;
        debug!(response = %text, "classification response");

        Ok(parse_classification(&text))
    }
}
