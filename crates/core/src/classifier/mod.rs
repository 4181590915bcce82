//! Ticket classification via a generative text model.

mod client;
mod parser;
mod traits;
mod types;

pub use client::GeminiClient;
pub use parser::parse_classification;
pub use traits::Classifier;
pub use types::{ClassificationError, ClassificationResult};
