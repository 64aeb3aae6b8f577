//! Presidio redaction - PII scrubbing for OTLP traces and logs.
//!
//! This crate is a telemetry pipeline processor. It does no detection of its
//! own: every string-valued attribute (and, for logs, every string body) is
//! sent to a Presidio analyzer, the findings are sent with the text to a
//! Presidio anonymizer, and the anonymized text is written back in place.
//!
//! # Architecture
//!
//! - `presidio`: JSON-over-HTTP client for the analyzer and anonymizer
//! - `redactor`: detect-then-anonymize round trip for a single field
//! - `processor`: batch traversal, concurrency and cancellation
//! - `factory`: registration surface for a pipeline host
//! - `core`: configuration and errors
//! - `cli`: standalone binary for redacting OTLP protobuf files
//!
//! # Availability over strict redaction
//!
//! A field whose round trip fails keeps its original value; the failure is
//! logged and the rest of the batch is still redacted and forwarded. If the
//! Presidio services are degraded, downstream consumers can therefore see
//! unredacted values.
//!
//! # Example
//!
//! ```no_run
//! use presidio_redaction::core::Config;
//! use presidio_redaction::processor::PresidioRedactionProcessor;
//! use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new(
//!         "http://localhost:5002/analyze",
//!         "http://localhost:5001/anonymize",
//!     )?;
//!     let processor = PresidioRedactionProcessor::from_config(&config)?;
//!
//!     let mut batch = ExportTraceServiceRequest::default();
//!     let stats = processor.redact_traces(&mut batch, &CancellationToken::new()).await;
//!     println!("redacted {} fields", stats.redacted);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod factory;
pub mod presidio;
pub mod processor;
pub mod redactor;

// Re-export core types for convenience
pub use crate::core::{Config, RedactionError, Result};
pub use crate::processor::{PresidioRedactionProcessor, RedactionProcessor, RedactionStats};
pub use crate::redactor::{FieldRedactor, TextRedactor};
