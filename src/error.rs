use crate::batch::{BatchFailure, FetchError};
use crate::transport::{ApiResponse, TransportError};
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.instance_url", "payload.item.quantity")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config", "reject_item")
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

/// Unified error type for the OMS client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote error: HTTP {status}: {message}")]
    Remote {
        status: u16,
        message: String,
        data: serde_json::Value,
    },

    /// One or more batches of a batched fetch failed. `responses` holds the
    /// outcome of every batch, in batch order, for diagnostics.
    #[error("Batched fetch failed: {} of {} batches failed{}", .failed.len(), .responses.len(), format_failures(.failed))]
    BatchFailed {
        failed: Vec<BatchFailure>,
        responses: Vec<std::result::Result<ApiResponse, Error>>,
    },
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

fn format_failures(failed: &[BatchFailure]) -> String {
    if failed.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = failed
        .iter()
        .map(|f| format!("batch {}: {}", f.index, f.reason))
        .collect();
    format!(" ({})", parts.join("; "))
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::validation_with_context(msg, ErrorContext::new())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// Indices of the failed batches when this is a batched-fetch failure.
    pub fn failed_batches(&self) -> Option<Vec<usize>> {
        match self {
            Error::BatchFailed { failed, .. } => Some(failed.iter().map(|f| f.index).collect()),
            _ => None,
        }
    }
}

impl From<FetchError<ApiResponse, Error>> for Error {
    fn from(err: FetchError<ApiResponse, Error>) -> Self {
        match err {
            FetchError::InvalidBatchSize(size) => Error::validation_with_context(
                "max batch size must be a positive integer",
                ErrorContext::new()
                    .with_field_path("max_batch_size")
                    .with_details(format!("got {}", size))
                    .with_source("batch_fetcher"),
            ),
            FetchError::PartialFailure { failed, outcomes } => Error::BatchFailed {
                failed,
                responses: outcomes,
            },
        }
    }
}
