//! Dispatcher-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Backend call failed: {operation}: {message}")]
    Backend { operation: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {field}: {message}")]
    Configuration { field: String, message: String },

    #[error("Missing credential: {key}")]
    MissingCredential { key: String },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Audit log write failed: {message}")]
    Audit { message: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
