//! Locating the redactable text fields of an OTLP batch.
//!
//! A field is redactable when it holds an `AnyValue::StringValue`: resource
//! attributes, span attributes, log record attributes and log record bodies.
//! Everything else (span names, numeric/bool/bytes values, arrays, kvlists)
//! is left alone.

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::{any_value::Value, AnyValue, KeyValue};
use opentelemetry_proto::tonic::resource::v1::Resource;
use std::fmt;

/// Which part of the batch a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Attribute of a resource
    ResourceAttribute,
    /// Attribute of a span
    SpanAttribute,
    /// Attribute of a log record
    LogAttribute,
    /// Body of a log record
    LogBody,
}

impl FieldKind {
    /// Short name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::ResourceAttribute => "resource_attribute",
            FieldKind::SpanAttribute => "span_attribute",
            FieldKind::LogAttribute => "log_attribute",
            FieldKind::LogBody => "log_body",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a field inside its batch, for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLocation {
    /// Field kind
    pub kind: FieldKind,
    /// Index of the resource group
    pub resource: usize,
    /// Index of the scope group; `None` for resource attributes
    pub scope: Option<usize>,
    /// Index of the span or log record; `None` for resource attributes
    pub record: Option<usize>,
    /// Attribute key; `None` for log bodies
    pub key: Option<String>,
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} resource[{}]", self.kind, self.resource)?;
        if let Some(scope) = self.scope {
            write!(f, " scope[{}]", scope)?;
        }
        if let Some(record) = self.record {
            write!(f, " record[{}]", record)?;
        }
        if let Some(key) = &self.key {
            write!(f, " key={:?}", key)?;
        }
        Ok(())
    }
}

/// A redactable string inside a batch, borrowed mutably for write-back.
#[derive(Debug)]
pub struct FieldSlot<'a> {
    /// Where the value lives
    pub location: FieldLocation,
    /// The value itself
    pub value: &'a mut String,
}

/// Collect every redactable field of a traces batch.
pub fn trace_fields(batch: &mut ExportTraceServiceRequest) -> Vec<FieldSlot<'_>> {
    let mut slots = Vec::new();

    for (r, resource_spans) in batch.resource_spans.iter_mut().enumerate() {
        visit_resource(&mut slots, resource_spans.resource.as_mut(), r);

        for (s, scope_spans) in resource_spans.scope_spans.iter_mut().enumerate() {
            for (i, span) in scope_spans.spans.iter_mut().enumerate() {
                let at = Position::record(FieldKind::SpanAttribute, r, s, i);
                visit_attributes(&mut slots, &mut span.attributes, at);
            }
        }
    }

    slots
}

/// Collect every redactable field of a logs batch.
pub fn log_fields(batch: &mut ExportLogsServiceRequest) -> Vec<FieldSlot<'_>> {
    let mut slots = Vec::new();

    for (r, resource_logs) in batch.resource_logs.iter_mut().enumerate() {
        visit_resource(&mut slots, resource_logs.resource.as_mut(), r);

        for (s, scope_logs) in resource_logs.scope_logs.iter_mut().enumerate() {
            for (i, record) in scope_logs.log_records.iter_mut().enumerate() {
                let at = Position::record(FieldKind::LogAttribute, r, s, i);
                visit_attributes(&mut slots, &mut record.attributes, at);

                if let Some(body) = string_value(record.body.as_mut()) {
                    slots.push(FieldSlot {
                        location: Position::record(FieldKind::LogBody, r, s, i).locate(None),
                        value: body,
                    });
                }
            }
        }
    }

    slots
}

#[derive(Clone, Copy)]
struct Position {
    kind: FieldKind,
    resource: usize,
    scope: Option<usize>,
    record: Option<usize>,
}

impl Position {
    fn resource(resource: usize) -> Self {
        Self {
            kind: FieldKind::ResourceAttribute,
            resource,
            scope: None,
            record: None,
        }
    }

    fn record(kind: FieldKind, resource: usize, scope: usize, record: usize) -> Self {
        Self {
            kind,
            resource,
            scope: Some(scope),
            record: Some(record),
        }
    }

    fn locate(self, key: Option<&str>) -> FieldLocation {
        FieldLocation {
            kind: self.kind,
            resource: self.resource,
            scope: self.scope,
            record: self.record,
            key: key.map(str::to_string),
        }
    }
}

fn visit_resource<'a>(
    slots: &mut Vec<FieldSlot<'a>>,
    resource: Option<&'a mut Resource>,
    index: usize,
) {
    if let Some(resource) = resource {
        visit_attributes(slots, &mut resource.attributes, Position::resource(index));
    }
}

fn visit_attributes<'a>(
    slots: &mut Vec<FieldSlot<'a>>,
    attributes: &'a mut [KeyValue],
    at: Position,
) {
    for kv in attributes {
        if let Some(value) = string_value(kv.value.as_mut()) {
            slots.push(FieldSlot {
                location: at.locate(Some(&kv.key)),
                value,
            });
        }
    }
}

fn string_value(value: Option<&mut AnyValue>) -> Option<&mut String> {
    match value {
        Some(AnyValue {
            value: Some(Value::StringValue(s)),
        }) => Some(s),
        _ => None,
    }
}
