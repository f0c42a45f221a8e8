use crate::transport::TransportError;
use thiserror::Error;

/// Status code the batch endpoint uses to signal rate limiting.
pub const RATE_LIMITED_STATUS: u16 = 429;

/// Structured error context for configuration problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key that caused the error (e.g., "batch_size", "base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected range, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config", "http_transport")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for batch execution.
///
/// Only [`Error::Configuration`] ever escapes [`crate::BatchProcessor::process_batch`];
/// every other variant is captured per group and turned into failed outcomes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Remote error: {}: {message}", format_status(.status))]
    Remote {
        status: Option<u16>,
        message: String,
        /// Raw `Retry-After` value as sent by the server, if any.
        retry_after: Option<String>,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Batch response mismatch: expected {expected} sub-responses, got {actual}")]
    ResponseMismatch { expected: usize, actual: usize },
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(s) => format!("HTTP {}", s),
        None => "no status".to_string(),
    }
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Envelope-level failure reported by the batch endpoint.
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Remote {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Rate-limit signal, optionally carrying the server's retry hint.
    pub fn rate_limited(retry_after: Option<String>) -> Self {
        Error::Remote {
            status: Some(RATE_LIMITED_STATUS),
            message: "rate limited".to_string(),
            retry_after,
        }
    }

    /// HTTP status attached to the error, when known.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => *status,
            Error::Transport(TransportError::Http(e)) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(RATE_LIMITED_STATUS)
    }

    /// Server-supplied retry hint, unparsed.
    pub fn retry_hint(&self) -> Option<&str> {
        match self {
            Error::Remote { retry_after, .. } => retry_after.as_deref(),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}
