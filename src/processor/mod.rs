//! Batch-level redaction of OTLP traces and logs.
//!
//! The processor walks a batch, collects every string-valued field (see
//! [`fields`]) and runs each one through a [`TextRedactor`]. Failures are
//! absorbed per field: the error is logged, the original value stays in place
//! and the walk continues. A degraded Presidio deployment therefore lets
//! unredacted values through instead of dropping the batch.

pub mod fields;

use crate::core::{Config, RedactionError, Result};
use crate::factory::{Capabilities, LogsProcessor, Processor, TracesProcessor, CAPABILITIES};
use crate::presidio::PresidioClient;
use crate::redactor::{FieldRedactor, TextRedactor};
use async_trait::async_trait;
use fields::FieldSlot;
use futures::stream::{self, StreamExt};
use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use tokio_util::sync::CancellationToken;

/// Outcome counts of one redaction pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RedactionStats {
    /// String fields found in the batch
    pub visited: usize,
    /// Fields replaced with the anonymized text
    pub redacted: usize,
    /// Fields left unchanged because the round trip failed
    pub failed: usize,
    /// Fields left unchanged because the pass was cancelled
    pub skipped: usize,
}

impl RedactionStats {
    fn record(&mut self, outcome: FieldOutcome) {
        match outcome {
            FieldOutcome::Redacted => self.redacted += 1,
            FieldOutcome::Failed => self.failed += 1,
            FieldOutcome::Skipped => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOutcome {
    Redacted,
    Failed,
    Skipped,
}

/// Redacts every string field of a batch in place.
pub struct RedactionProcessor<R> {
    redactor: R,
    max_concurrent_fields: usize,
}

/// Processor backed by the Presidio HTTP services.
pub type PresidioRedactionProcessor = RedactionProcessor<FieldRedactor>;

impl PresidioRedactionProcessor {
    /// Build the Presidio client and processor from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = PresidioClient::new(config)?;
        Ok(Self::new(FieldRedactor::new(client), config.max_concurrent_fields))
    }
}

impl<R: TextRedactor> RedactionProcessor<R> {
    /// Create a processor redacting up to `max_concurrent_fields` fields at once.
    pub fn new(redactor: R, max_concurrent_fields: usize) -> Self {
        Self {
            redactor,
            max_concurrent_fields: max_concurrent_fields.max(1),
        }
    }

    /// Redact resource and span attributes of a traces batch.
    pub async fn redact_traces(
        &self,
        batch: &mut ExportTraceServiceRequest,
        cancel: &CancellationToken,
    ) -> RedactionStats {
        let stats = self.redact_fields(fields::trace_fields(batch), cancel).await;
        tracing::debug!(
            visited = stats.visited,
            redacted = stats.redacted,
            failed = stats.failed,
            skipped = stats.skipped,
            "Redacted traces batch"
        );
        stats
    }

    /// Redact resource attributes, record attributes and string bodies of a logs batch.
    pub async fn redact_logs(
        &self,
        batch: &mut ExportLogsServiceRequest,
        cancel: &CancellationToken,
    ) -> RedactionStats {
        let stats = self.redact_fields(fields::log_fields(batch), cancel).await;
        tracing::debug!(
            visited = stats.visited,
            redacted = stats.redacted,
            failed = stats.failed,
            skipped = stats.skipped,
            "Redacted logs batch"
        );
        stats
    }

    async fn redact_fields(
        &self,
        slots: Vec<FieldSlot<'_>>,
        cancel: &CancellationToken,
    ) -> RedactionStats {
        let mut stats = RedactionStats {
            visited: slots.len(),
            ..RedactionStats::default()
        };

        let mut pending = Vec::with_capacity(slots.len());
        for slot in slots {
            pending.push(self.redact_slot(slot, cancel));
        }

        let outcomes: Vec<FieldOutcome> = stream::iter(pending)
            .buffer_unordered(self.max_concurrent_fields)
            .collect()
            .await;

        for outcome in outcomes {
            stats.record(outcome);
        }

        if stats.skipped > 0 {
            tracing::warn!(
                skipped = stats.skipped,
                "Redaction cancelled, remaining fields forwarded unredacted"
            );
        }

        stats
    }

    async fn redact_slot(&self, slot: FieldSlot<'_>, cancel: &CancellationToken) -> FieldOutcome {
        if cancel.is_cancelled() {
            return FieldOutcome::Skipped;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RedactionError::Cancelled),
            result = self.redactor.redact(slot.value.as_str()) => result,
        };

        match result {
            Ok(redacted) => {
                *slot.value = redacted;
                FieldOutcome::Redacted
            },
            Err(RedactionError::Cancelled) => FieldOutcome::Skipped,
            Err(err) => {
                tracing::error!(
                    field = %slot.location,
                    category = err.category(),
                    error = %err,
                    "Failed to redact field, keeping original value"
                );
                FieldOutcome::Failed
            },
        }
    }
}

impl<R: TextRedactor> Processor for RedactionProcessor<R> {
    fn capabilities(&self) -> Capabilities {
        CAPABILITIES
    }
}

#[async_trait]
impl<R: TextRedactor> TracesProcessor for RedactionProcessor<R> {
    async fn process_traces(
        &self,
        mut batch: ExportTraceServiceRequest,
        cancel: &CancellationToken,
    ) -> Result<ExportTraceServiceRequest> {
        self.redact_traces(&mut batch, cancel).await;
        Ok(batch)
    }
}

#[async_trait]
impl<R: TextRedactor> LogsProcessor for RedactionProcessor<R> {
    async fn process_logs(
        &self,
        mut batch: ExportLogsServiceRequest,
        cancel: &CancellationToken,
    ) -> Result<ExportLogsServiceRequest> {
        self.redact_logs(&mut batch, cancel).await;
        Ok(batch)
    }
}
