//! HTTP client for the Presidio analyzer and anonymizer services.

use crate::core::{Config, RedactionError, Result};
use crate::presidio::types::{
    AnalyzerRequest, AnalyzerResponse, AnonymizerConfig, AnonymizerRequest, AnonymizerResponse,
    RecognizerResult,
};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// Client for the two Presidio endpoints.
///
/// Holds one pooled `reqwest::Client`, so a single instance can be shared
/// across concurrent field redactions. Requests are never retried.
#[derive(Debug, Clone)]
pub struct PresidioClient {
    http: reqwest::Client,
    analyzer_endpoint: String,
    anonymizer_endpoint: String,
    language: String,
    score_threshold: f64,
    entities: Vec<String>,
    context: Vec<String>,
    correlation_id: Option<String>,
    anonymizers: BTreeMap<String, AnonymizerConfig>,
}

impl PresidioClient {
    /// Create a client from a validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RedactionError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            analyzer_endpoint: config.analyzer_endpoint.clone(),
            anonymizer_endpoint: config.anonymizer_endpoint.clone(),
            language: config.analyzer.language.clone(),
            score_threshold: config.analyzer.score_threshold,
            entities: config.analyzer.entities.clone(),
            context: config.analyzer.context.clone(),
            correlation_id: config.analyzer.correlation_id.clone(),
            anonymizers: config.anonymizers.clone(),
        })
    }

    /// Ask the analyzer for the PII findings in `text`.
    pub async fn analyze(&self, text: &str) -> Result<Vec<RecognizerResult>> {
        let request = AnalyzerRequest {
            text: text.to_string(),
            language: self.language.clone(),
            score_threshold: self.score_threshold,
            entities: self.entities.clone(),
            context: self.context.clone(),
            correlation_id: self.correlation_id.clone(),
            return_decision_process: false,
            ad_hoc_recognizers: Vec::new(),
        };

        let response: AnalyzerResponse = self.post_json(&self.analyzer_endpoint, &request).await?;
        let results = response.into_results();

        tracing::debug!(
            endpoint = %self.analyzer_endpoint,
            findings = results.len(),
            "Presidio analyzer call succeeded"
        );

        Ok(results)
    }

    /// Ask the anonymizer to rewrite `text` given the analyzer's findings.
    pub async fn anonymize(
        &self,
        text: &str,
        analyzer_results: &[RecognizerResult],
    ) -> Result<AnonymizerResponse> {
        let request = AnonymizerRequest {
            text,
            anonymizers: &self.anonymizers,
            analyzer_results,
        };

        let response: AnonymizerResponse =
            self.post_json(&self.anonymizer_endpoint, &request).await?;

        tracing::debug!(
            endpoint = %self.anonymizer_endpoint,
            operations = response.items.len(),
            "Presidio anonymizer call succeeded"
        );

        Ok(response)
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;

        let response = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(payload)
            .send()
            .await
            .map_err(|e| RedactionError::transport(format!("POST {} failed: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RedactionError::service(endpoint, status.as_u16(), &body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            RedactionError::decode(format!("unexpected response from {}: {}", endpoint, e))
        })
    }
}
