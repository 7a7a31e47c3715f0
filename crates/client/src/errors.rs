//! Error types for the client adapter.
//!
//! [`TransportError`] covers failures to exchange bytes with the service,
//! [`ClientError`] covers everything [`crate::Client::query`] can report, and
//! [`ConfigError`] covers loading [`crate::ClientConfig`].

use std::path::PathBuf;

use thiserror::Error;
use types::{FieldError, ValueError};

use crate::ApiError;

/// No response could be obtained from the service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Building the client, connecting, sending, or reading the body failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("A secret is required to connect")]
    MissingSecret,
}

/// Failures of a single query round trip.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The expression could not be written as JSON.
    #[error("Failed to encode query: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body was not a valid value tree.
    #[error("Malformed response body: {0}")]
    Body(#[from] ValueError),

    /// The response was valid JSON but not shaped like a service response.
    #[error("Unexpected response shape: {0}")]
    Shape(#[from] FieldError),

    /// The service rejected the query.
    #[error("Request failed with status {status}: {}", render_errors(errors))]
    Request { status: u16, errors: Vec<ApiError> },
}

fn render_errors(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.description))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures loading client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
