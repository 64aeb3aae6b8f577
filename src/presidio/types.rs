//! Wire types for the Presidio analyzer and anonymizer HTTP APIs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of a `POST` to the analyzer endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzerRequest {
    /// Text to scan for PII
    pub text: String,
    /// Two-letter language tag
    pub language: String,
    /// Minimum confidence for a finding to be returned
    pub score_threshold: f64,
    /// Restrict detection to these entity types
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<String>,
    /// Context words that boost recognizer confidence
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    /// Correlation id echoed back in service logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Ask the service to explain each finding
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub return_decision_process: bool,
    /// Additional recognizers defined inline
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ad_hoc_recognizers: Vec<String>,
}

/// One PII finding reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerResult {
    /// Start offset (characters, inclusive)
    pub start: usize,
    /// End offset (characters, exclusive)
    pub end: usize,
    /// Confidence score
    pub score: f64,
    /// Entity label, e.g. `EMAIL_ADDRESS`
    pub entity_type: String,
    /// Recognizer metadata, passed back to the anonymizer untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognition_metadata: Option<serde_json::Value>,
}

/// Analyzer responses are usually an array, but a single finding object is accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnalyzerResponse {
    /// Array of findings
    Many(Vec<RecognizerResult>),
    /// A single finding
    One(RecognizerResult),
}

impl AnalyzerResponse {
    /// Flatten into the list of findings.
    pub fn into_results(self) -> Vec<RecognizerResult> {
        match self {
            AnalyzerResponse::Many(results) => results,
            AnalyzerResponse::One(result) => vec![result],
        }
    }
}

/// Operator applied by the anonymizer to one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnonymizerConfig {
    /// Replace the entity with a fixed value
    Replace {
        /// Replacement text
        new_value: String,
    },
    /// Remove the entity entirely
    Redact,
    /// Overwrite characters with a masking character
    Mask {
        /// Character used for masking
        masking_char: String,
        /// How many characters to mask
        chars_to_mask: usize,
        /// Mask from the end of the entity instead of the start
        #[serde(default)]
        from_end: bool,
    },
    /// Replace the entity with its hash
    Hash {
        /// Hash algorithm, e.g. `sha256`
        hash_type: String,
    },
    /// Replace the entity with its ciphertext
    Encrypt {
        /// Encryption key
        key: String,
    },
}

/// Body of a `POST` to the anonymizer endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnonymizerRequest<'a> {
    /// Original text
    pub text: &'a str,
    /// Operator policy keyed by entity type (or `DEFAULT`); empty means service default
    pub anonymizers: &'a BTreeMap<String, AnonymizerConfig>,
    /// Findings returned by the analyzer for `text`
    pub analyzer_results: &'a [RecognizerResult],
}

/// Per-entity operation reported by the anonymizer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperatorResult {
    /// Operator that was applied
    #[serde(default, alias = "operation")]
    pub operator: Option<String>,
    /// Entity label
    pub entity_type: String,
    /// Start offset in the anonymized text
    pub start: usize,
    /// End offset in the anonymized text
    pub end: usize,
    /// Replacement text for this entity
    #[serde(default)]
    pub text: Option<String>,
}

/// Response of the anonymizer endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnonymizerResponse {
    /// Fully anonymized text
    pub text: String,
    /// Per-entity operations
    #[serde(default)]
    pub items: Vec<OperatorResult>,
    /// Operator applied, when the service answers with a single flat item
    #[serde(default)]
    pub operation: Option<String>,
    /// Entity label of the flat item
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Start offset of the flat item
    #[serde(default)]
    pub start: Option<usize>,
    /// End offset of the flat item
    #[serde(default)]
    pub end: Option<usize>,
}
