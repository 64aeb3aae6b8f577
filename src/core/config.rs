//! Configuration for the Presidio redaction processor.
//!
//! Configuration is normally handed over by the pipeline host, but it can
//! also be loaded from YAML for the standalone binary:
//!
//! ```yaml
//! analyzer_endpoint: http://localhost:5002/analyze
//! anonymizer_endpoint: http://localhost:5001/anonymize
//! analyzer:
//!   score_threshold: 0.6
//! anonymizers:
//!   DEFAULT:
//!     type: replace
//!     new_value: "<REDACTED>"
//! ```

use crate::core::{RedactionError, Result};
use crate::presidio::types::AnonymizerConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Default analyzer language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default minimum confidence for analyzer findings.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

/// Complete configuration for the processor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Full URL of the Presidio analyzer endpoint
    pub analyzer_endpoint: String,
    /// Full URL of the Presidio anonymizer endpoint
    pub anonymizer_endpoint: String,
    /// Analyzer request options
    pub analyzer: AnalyzerConfig,
    /// Anonymizer operators keyed by entity type; empty uses the service default
    pub anonymizers: BTreeMap<String, AnonymizerConfig>,
    /// Per-request timeout; `None` relies on the caller's cancellation only
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    /// Number of fields redacted concurrently within one batch
    pub max_concurrent_fields: usize,
    /// Logging configuration, used by the binary
    pub logging: LoggingConfig,
}

/// Analyzer request options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Language tag sent with every request
    pub language: String,
    /// Minimum confidence score
    pub score_threshold: f64,
    /// Entity types to look for; empty means all
    pub entities: Vec<String>,
    /// Context words
    pub context: Vec<String>,
    /// Correlation id attached to every request
    pub correlation_id: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Emit JSON log lines
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-request detail
    Trace,
    /// Per-call and per-batch diagnostics
    Debug,
    /// Startup and run summaries
    Info,
    /// Cancelled batches
    Warn,
    /// Failed fields only
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            analyzer_endpoint: String::new(),
            anonymizer_endpoint: String::new(),
            analyzer: AnalyzerConfig::default(),
            anonymizers: BTreeMap::new(),
            request_timeout: None,
            max_concurrent_fields: 1,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            language: DEFAULT_LANGUAGE.to_string(),
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            entities: Vec::new(),
            context: Vec::new(),
            correlation_id: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Create a config pointing at the two Presidio endpoints
    pub fn new(
        analyzer_endpoint: impl Into<String>,
        anonymizer_endpoint: impl Into<String>,
    ) -> Result<Self> {
        ConfigBuilder::new()
            .analyzer_endpoint(analyzer_endpoint)
            .anonymizer_endpoint(anonymizer_endpoint)
            .build()
    }

    /// Load and validate a YAML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        ConfigBuilder::new().from_file(path)?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_endpoint("analyzer_endpoint", &self.analyzer_endpoint)?;
        validate_endpoint("anonymizer_endpoint", &self.anonymizer_endpoint)?;

        if self.analyzer.language.trim().is_empty() {
            return Err(RedactionError::config("analyzer.language must not be empty"));
        }

        let threshold = self.analyzer.score_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RedactionError::config(format!(
                "analyzer.score_threshold must be between 0.0 and 1.0, got {}",
                threshold
            )));
        }

        if self.max_concurrent_fields == 0 {
            return Err(RedactionError::config("max_concurrent_fields must be greater than 0"));
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(RedactionError::config("request_timeout must be greater than 0"));
        }

        Ok(())
    }
}

fn validate_endpoint(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RedactionError::config(format!("{} is required", field)));
    }

    let url = reqwest::Url::parse(value)
        .map_err(|e| RedactionError::config(format!("invalid {} '{}': {}", field, value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(RedactionError::config(format!(
            "invalid {} '{}': unsupported scheme '{}'",
            field, value, other
        ))),
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| RedactionError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Load configuration from a YAML file
    pub fn from_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RedactionError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        self.from_yaml(&content)
    }

    /// Set the analyzer endpoint
    pub fn analyzer_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.analyzer_endpoint = endpoint.into();
        self
    }

    /// Set the anonymizer endpoint
    pub fn anonymizer_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.anonymizer_endpoint = endpoint.into();
        self
    }

    /// Set the analyzer language
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.analyzer.language = language.into();
        self
    }

    /// Set the minimum confidence score
    pub fn score_threshold(mut self, threshold: f64) -> Self {
        self.config.analyzer.score_threshold = threshold;
        self
    }

    /// Set the operator for one entity type (`DEFAULT` applies to all)
    pub fn anonymizer(
        mut self,
        entity_type: impl Into<String>,
        operator: AnonymizerConfig,
    ) -> Self {
        self.config.anonymizers.insert(entity_type.into(), operator);
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Set how many fields are redacted concurrently
    pub fn max_concurrent_fields(mut self, limit: usize) -> Self {
        self.config.max_concurrent_fields = limit;
        self
    }

    /// Set the log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
