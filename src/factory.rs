//! Registration surface for a telemetry pipeline host.
//!
//! The host owns instantiation, lifecycle and wiring. This module only
//! declares what the processor is called, what it does to the data it is
//! handed, and how to build one from configuration.

use crate::core::{Config, Result};
use crate::processor::PresidioRedactionProcessor;
use async_trait::async_trait;
use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use tokio_util::sync::CancellationToken;

/// Component type name used in pipeline configuration.
pub const TYPE: &str = "presidio_redaction";

/// What a processor does to the batches it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The processor modifies batches in place
    pub mutates_data: bool,
}

/// Capabilities of the redaction processor.
pub const CAPABILITIES: Capabilities = Capabilities { mutates_data: true };

/// Common surface of every pipeline processor.
pub trait Processor: Send + Sync {
    /// Static capability declaration.
    fn capabilities(&self) -> Capabilities;
}

/// Processor for trace batches.
#[async_trait]
pub trait TracesProcessor: Processor {
    /// Process one batch and hand it back for forwarding.
    ///
    /// An error means the batch should be dropped by the host.
    async fn process_traces(
        &self,
        batch: ExportTraceServiceRequest,
        cancel: &CancellationToken,
    ) -> Result<ExportTraceServiceRequest>;
}

/// Processor for log batches.
#[async_trait]
pub trait LogsProcessor: Processor {
    /// Process one batch and hand it back for forwarding.
    ///
    /// An error means the batch should be dropped by the host.
    async fn process_logs(
        &self,
        batch: ExportLogsServiceRequest,
        cancel: &CancellationToken,
    ) -> Result<ExportLogsServiceRequest>;
}

/// Default configuration; endpoints must still be filled in.
pub fn create_default_config() -> Config {
    Config::default()
}

/// Build the concrete processor; it serves both signals.
pub fn create_processor(config: &Config) -> Result<PresidioRedactionProcessor> {
    PresidioRedactionProcessor::from_config(config)
}

/// Build a traces processor.
pub fn create_traces_processor(config: &Config) -> Result<Box<dyn TracesProcessor>> {
    Ok(Box::new(create_processor(config)?))
}

/// Build a logs processor.
pub fn create_logs_processor(config: &Config) -> Result<Box<dyn LogsProcessor>> {
    Ok(Box::new(create_processor(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_incomplete() {
        assert!(create_default_config().validate().is_err());
    }

    #[test]
    fn test_create_rejects_missing_endpoints() {
        assert!(create_processor(&create_default_config()).is_err());
        assert!(create_traces_processor(&create_default_config()).is_err());
        assert!(create_logs_processor(&create_default_config()).is_err());
    }

    #[test]
    fn test_created_processors_mutate_data() {
        let config = Config::new("http://localhost:5002/analyze", "http://localhost:5001/anonymize")
            .unwrap();

        let traces = create_traces_processor(&config).unwrap();
        let logs = create_logs_processor(&config).unwrap();

        assert_eq!(traces.capabilities(), CAPABILITIES);
        assert!(logs.capabilities().mutates_data);
        assert_eq!(TYPE, "presidio_redaction");
    }
}
