use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("triage.db")
}

/// Gemini API configuration.
///
/// Immutable once loaded; the classification client takes its own copy at
/// construction.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// API key (required)
    pub api_key: String,
    /// Model name (default: "gemini-1.5-flash")
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature (default: 0.3)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens in the model output (default: 1000)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API base URL, overridable for testing against a local stub
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Background classification pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Number of concurrent classification workers (default: 4)
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Capacity of the task queue; submissions beyond it are dropped
    /// (default: 256)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    256
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gemini: SanitizedGeminiConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Sanitized Gemini config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGeminiConfig {
    pub model: String,
    pub api_key_configured: bool,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            gemini: SanitizedGeminiConfig {
                model: config.gemini.model.clone(),
                api_key_configured: !config.gemini.api_key.is_empty(),
                temperature: config.gemini.temperature,
                max_tokens: config.gemini.max_tokens,
                api_base: config.gemini.api_base.clone(),
                timeout_secs: config.gemini.timeout_secs,
            },
            orchestrator: config.orchestrator.clone(),
        }
    }
}
