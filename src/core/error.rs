use thiserror::Error;

/// Errors raised while redacting telemetry through the Presidio services.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// The request could not be sent or the connection failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service was reachable but answered with a non-success status.
    #[error("Service error: {endpoint} returned status {status}: {body}")]
    Service {
        /// Endpoint that was called
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The response body did not have the expected JSON shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The caller cancelled before the round trip finished.
    #[error("Redaction cancelled")]
    Cancelled,

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An OTLP protobuf payload could not be decoded.
    #[error("Protobuf error: {0}")]
    Protobuf(String),

    /// File or stdio failure in the binary.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A request body could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for redaction operations
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Upper bound on how much of an error body is kept in [`RedactionError::Service`].
const MAX_ERROR_BODY: usize = 512;

impl RedactionError {
    /// Creates a new transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a new service error, truncating long bodies
    pub fn service<E: Into<String>>(endpoint: E, status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(MAX_ERROR_BODY) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::Service {
            endpoint: endpoint.into(),
            status,
            body,
        }
    }

    /// Creates a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new protobuf error
    pub fn protobuf<S: Into<String>>(msg: S) -> Self {
        Self::Protobuf(msg.into())
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Service { .. } => "service",
            Self::Decode(_) => "decode",
            Self::Cancelled => "cancelled",
            Self::Config(_) => "config",
            Self::Protobuf(_) | Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for RedactionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
