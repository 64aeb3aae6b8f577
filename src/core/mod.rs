//! Configuration and error types shared by every part of the processor.

#![warn(missing_docs)]

pub mod config;
/// Error taxonomy and `Result` alias
pub mod error;

// Re-export commonly used types
pub use config::{AnalyzerConfig, Config, ConfigBuilder, LogLevel, LoggingConfig};
pub use error::{RedactionError, Result};
