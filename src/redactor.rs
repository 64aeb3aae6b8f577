//! Single-field redaction: analyze, then anonymize.

use crate::core::Result;
use crate::presidio::PresidioClient;
use async_trait::async_trait;

/// Turns one text value into its redacted form.
///
/// Implementations must be safe to call concurrently for different fields.
#[async_trait]
pub trait TextRedactor: Send + Sync {
    /// Redact `text`, returning the replacement value.
    async fn redact(&self, text: &str) -> Result<String>;
}

/// Two-hop Presidio redaction of a single field.
///
/// The analyzer runs first; its findings are handed to the anonymizer. A
/// failure of either hop fails the field and the anonymizer is never called
/// after an analyzer failure. Nothing is retried.
#[derive(Debug, Clone)]
pub struct FieldRedactor {
    client: PresidioClient,
}

impl FieldRedactor {
    /// Wrap a Presidio client.
    pub fn new(client: PresidioClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextRedactor for FieldRedactor {
    async fn redact(&self, text: &str) -> Result<String> {
        let findings = self.client.analyze(text).await?;
        let anonymized = self.client.anonymize(text, &findings).await?;
        Ok(anonymized.text)
    }
}
