//! Common test utilities: a stub Presidio service and OTLP batch fixtures.

#![allow(dead_code)]

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::{any_value::Value, AnyValue, KeyValue};
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span};
use presidio_redaction::core::{Config, ConfigBuilder};
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stub Presidio deployment serving `/analyze` and `/anonymize`.
pub struct PresidioStub {
    pub server: MockServer,
}

impl PresidioStub {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn analyzer_endpoint(&self) -> String {
        format!("{}/analyze", self.server.uri())
    }

    pub fn anonymizer_endpoint(&self) -> String {
        format!("{}/anonymize", self.server.uri())
    }

    pub fn config(&self) -> Config {
        self.config_builder().build().unwrap()
    }

    pub fn config_builder(&self) -> ConfigBuilder {
        ConfigBuilder::new()
            .analyzer_endpoint(self.analyzer_endpoint())
            .anonymizer_endpoint(self.anonymizer_endpoint())
    }

    /// Analyzer reports the whole of `text` as one `entity`.
    pub async fn detects(&self, text: &str, entity: &str) {
        let end = text.chars().count();
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_partial_json(json!({"text": text})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"start": 0, "end": end, "score": 0.95, "entity_type": entity}
            ])))
            .mount(&self.server)
            .await;
    }

    /// Analyzer answers every request with `status`.
    pub async fn analyzer_fails(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(status).set_body_string("analyzer unavailable"))
            .mount(&self.server)
            .await;
    }

    /// Anonymizer turns `text` into `replacement`.
    pub async fn anonymizes(&self, text: &str, replacement: &str) {
        Mock::given(method("POST"))
            .and(path("/anonymize"))
            .and(body_partial_json(json!({"text": text})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": replacement})))
            .mount(&self.server)
            .await;
    }

    /// Anonymizer answers `status` for `text`.
    pub async fn anonymizer_fails_for(&self, text: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path("/anonymize"))
            .and(body_partial_json(json!({"text": text})))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Full round trip for `text`: detected as `entity`, replaced by `replacement`.
    pub async fn redacts(&self, text: &str, entity: &str, replacement: &str) {
        self.detects(text, entity).await;
        self.anonymizes(text, replacement).await;
    }

    /// Number of requests received on `endpoint_path`.
    pub async fn calls_to(&self, endpoint_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == endpoint_path)
            .count()
    }
}

pub fn string_attr(key: &str, value: &str) -> KeyValue {
    attr(key, Value::StringValue(value.to_string()))
}

pub fn attr(key: &str, value: Value) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue { value: Some(value) }),
    }
}

/// Traces batch with one resource, one scope and one span.
pub fn traces_batch(
    resource_attrs: Vec<KeyValue>,
    span_attrs: Vec<KeyValue>,
) -> ExportTraceServiceRequest {
    ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            resource: Some(Resource {
                attributes: resource_attrs,
                ..Default::default()
            }),
            scope_spans: vec![ScopeSpans {
                spans: vec![Span {
                    trace_id: vec![1; 16],
                    span_id: vec![2; 8],
                    name: "POST /signup".to_string(),
                    attributes: span_attrs,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

/// Logs batch with one resource, one scope and one record.
pub fn logs_batch(body: Option<Value>, attrs: Vec<KeyValue>) -> ExportLogsServiceRequest {
    ExportLogsServiceRequest {
        resource_logs: vec![ResourceLogs {
            resource: Some(Resource::default()),
            scope_logs: vec![ScopeLogs {
                log_records: vec![LogRecord {
                    severity_text: "INFO".to_string(),
                    body: body.map(|value| AnyValue { value: Some(value) }),
                    attributes: attrs,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

/// String value of the first attribute named `key`.
pub fn string_of<'a>(attrs: &'a [KeyValue], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|kv| kv.key == key)
        .and_then(|kv| kv.value.as_ref())
        .and_then(|value| match &value.value {
            Some(Value::StringValue(s)) => Some(s.as_str()),
            _ => None,
        })
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Install a plain-text subscriber writing here for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect()
    }

    /// ERROR lines emitted for fields that kept their original value.
    pub fn field_errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains("ERROR") && line.contains("Failed to redact field"))
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
