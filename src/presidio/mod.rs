//! Presidio analyzer/anonymizer protocol.
//!
//! The analyzer finds PII spans in a text; the anonymizer rewrites the text
//! given those spans. Both are plain JSON-over-HTTP services.

pub mod client;
pub mod types;

pub use client::PresidioClient;
pub use types::{AnonymizerConfig, AnonymizerResponse, RecognizerResult};
