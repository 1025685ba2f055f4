//! Edit pipeline error types

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while producing an edit proposal
#[derive(Debug, Error)]
pub enum AssistError {
    #[error("Missing OpenRouter API key")]
    MissingApiKey,

    #[error("Invalid provider configuration: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    Input(String),

    #[error("OpenRouter API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("Failed to reach OpenRouter: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Failed to parse AI response as JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid AI response at {path}: {reason}")]
    Schema { path: String, reason: String },

    #[error("Request cancelled")]
    Cancelled,
}

/// Closed set of error categories reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationError,
    InputError,
    UpstreamError,
    MalformedResponseError,
    ParseError,
    SchemaError,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigurationError => "configuration_error",
            ErrorKind::InputError => "input_error",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::MalformedResponseError => "malformed_response_error",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::SchemaError => "schema_error",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl AssistError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssistError::MissingApiKey | AssistError::Configuration(_) => {
                ErrorKind::ConfigurationError
            }
            AssistError::Input(_) => ErrorKind::InputError,
            AssistError::Upstream { .. } | AssistError::Network(_) => ErrorKind::UpstreamError,
            AssistError::MalformedResponse(_) => ErrorKind::MalformedResponseError,
            AssistError::Parse(_) => ErrorKind::ParseError,
            AssistError::Schema { .. } => ErrorKind::SchemaError,
            AssistError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        AssistError::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for edit pipeline operations
pub type AssistResult<T> = Result<T, AssistError>;
