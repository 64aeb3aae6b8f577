//! Command-line interface for the redaction processor.
//!
//! Redacts one OTLP protobuf export request read from a file (or stdin) and
//! writes the result to a file (or stdout):
//!
//! ```text
//! presidio-redact --config redaction.yaml --kind logs --input batch.pb --output clean.pb
//! ```

use crate::core::{Config, ConfigBuilder, RedactionError, Result};
use crate::processor::{PresidioRedactionProcessor, RedactionStats};
use clap::{Parser, ValueEnum};
use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use prost::Message;
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Redact PII from OTLP traces and logs using Presidio
#[derive(Parser, Debug)]
#[command(name = "presidio-redact")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (YAML)
    #[arg(short, long, env = "PRESIDIO_REDACTION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Presidio analyzer endpoint, overrides the config file
    #[arg(long, env = "PRESIDIO_ANALYZER_ENDPOINT")]
    pub analyzer_endpoint: Option<String>,

    /// Presidio anonymizer endpoint, overrides the config file
    #[arg(long, env = "PRESIDIO_ANONYMIZER_ENDPOINT")]
    pub anonymizer_endpoint: Option<String>,

    /// Kind of OTLP export request in the input
    #[arg(short, long, value_enum, default_value_t = SignalKind::Traces)]
    pub kind: SignalKind,

    /// Input file with a protobuf export request (stdin if omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "PRESIDIO_REDACTION_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

/// Telemetry signal carried by the input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignalKind {
    /// `ExportTraceServiceRequest`
    Traces,
    /// `ExportLogsServiceRequest`
    Logs,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration: file first, then CLI/environment overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        if let Some(path) = &self.config {
            builder = builder.from_file(path)?;
            tracing::info!("Loaded configuration from: {:?}", path);
        }

        if let Some(endpoint) = &self.analyzer_endpoint {
            builder = builder.analyzer_endpoint(endpoint.as_str());
        }
        if let Some(endpoint) = &self.anonymizer_endpoint {
            builder = builder.anonymizer_endpoint(endpoint.as_str());
        }

        builder.build()
    }

    /// Initialize logging. Logs go to stderr so stdout can carry the output batch.
    pub fn init_logging(&self, config: Option<&Config>) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let level = match (self.debug, config) {
            (true, _) => "debug",
            (false, Some(config)) => config.logging.level.as_str(),
            (false, None) => "info",
        };
        let structured = config.is_some_and(|c| c.logging.structured);

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if structured {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .compact(),
                )
                .try_init()
        };

        result.map_err(|e| RedactionError::config(format!("Failed to initialize logging: {}", e)))
    }
}

/// Execute the CLI.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            cli.init_logging(None)?;
            return Err(e);
        },
    };
    cli.init_logging(Some(&config))?;

    if cli.check_config {
        println!("Configuration is valid!");
        println!("  Analyzer: {}", config.analyzer_endpoint);
        println!("  Anonymizer: {}", config.anonymizer_endpoint);
        println!("  Score threshold: {}", config.analyzer.score_threshold);
        println!("  Concurrent fields: {}", config.max_concurrent_fields);
        return Ok(());
    }

    let processor = PresidioRedactionProcessor::from_config(&config)?;
    let input = read_input(cli.input.as_ref()).await?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    let signal_handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal, skipping remaining fields");
            shutdown.cancel();
        }
    });

    let result = redact_bytes(&processor, cli.kind, &input, &cancel).await;
    signal_handle.abort();
    let (output, stats) = result?;

    tracing::info!(
        kind = ?cli.kind,
        visited = stats.visited,
        redacted = stats.redacted,
        failed = stats.failed,
        skipped = stats.skipped,
        "Redaction finished"
    );

    write_output(cli.output.as_ref(), &output).await
}

/// Decode, redact and re-encode one protobuf export request.
pub async fn redact_bytes(
    processor: &PresidioRedactionProcessor,
    kind: SignalKind,
    input: &[u8],
    cancel: &CancellationToken,
) -> Result<(Vec<u8>, RedactionStats)> {
    match kind {
        SignalKind::Traces => {
            let mut batch = ExportTraceServiceRequest::decode(input)
                .map_err(|e| RedactionError::protobuf(format!("trace decode error: {}", e)))?;
            let stats = processor.redact_traces(&mut batch, cancel).await;
            Ok((batch.encode_to_vec(), stats))
        },
        SignalKind::Logs => {
            let mut batch = ExportLogsServiceRequest::decode(input)
                .map_err(|e| RedactionError::protobuf(format!("logs decode error: {}", e)))?;
            let stats = processor.redact_logs(&mut batch, cancel).await;
            Ok((batch.encode_to_vec(), stats))
        },
    }
}

async fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => Ok(tokio::fs::read(path).await?),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            Ok(buf)
        },
    }
}

async fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => Ok(tokio::fs::write(path, bytes).await?),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(bytes).await?;
            stdout.flush().await?;
            Ok(())
        },
    }
}
