//! Total parser for model classification responses.
//!
//! Models do not reliably follow output instructions, so every field falls
//! back to a safe default instead of failing: GENERAL category, MEDIUM
//! priority, neutral sentiment 5. Parsing never returns an error.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::warn;

use crate::classifier::ClassificationResult;
use crate::ticket::{Category, Priority};

static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CATEGORY:\s*(\w+)").unwrap());
static PRIORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)PRIORITY:\s*(\w+)").unwrap());
static SENTIMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SENTIMENT:\s*(\d+)").unwrap());
static REASONING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)REASONING:\s*(.+)").unwrap());

/// Parse a model's free-text classification response.
///
/// Expected shape (case-insensitive labels, any surrounding prose ignored):
/// ```text
/// CATEGORY: <category>
/// PRIORITY: <priority>
/// SENTIMENT: <number>
/// REASONING: <brief explanation>
/// ```
pub fn parse_classification(response: &str) -> ClassificationResult {
    let category = match CATEGORY_RE
        .captures(response)
        .map(|c| c[1].to_uppercase())
    {
        Some(token) => Category::from_str_token(&token).unwrap_or_else(|| {
            warn!(category = %token, "invalid category, defaulting to GENERAL");
            Category::General
        }),
        None => Category::General,
    };

    let priority = match PRIORITY_RE
        .captures(response)
        .map(|c| c[1].to_uppercase())
    {
        Some(token) => Priority::from_str_token(&token).unwrap_or_else(|| {
            warn!(priority = %token, "invalid priority, defaulting to MEDIUM");
            Priority::Medium
        }),
        None => Priority::Medium,
    };

    // Clamp to 1-10; a number too large to parse counts as absent.
    let sentiment = SENTIMENT_RE
        .captures(response)
        .and_then(|c| c[1].parse::<u32>().ok())
        .map_or(5, |n| n.clamp(1, 10) as u8);

    let reasoning = REASONING_RE
        .captures(response)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty());

    ClassificationResult {
        category,
        priority,
        sentiment,
        reasoning,
    }
}
