//! HTTP client adapter for the database service.
//!
//! Serializes [`query::Expr`] trees, posts them to the service and decodes the
//! response body into a [`types::Value`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All network I/O and request logging live here, behind
//! the [`HttpTransport`] port. [`Client`] contains only request and response
//! shaping, so it runs unchanged against an in-memory transport in tests.
//!
//! Retries, metrics and token lifecycle management are out of scope.

pub mod client;
pub mod config;
pub mod connection;
pub mod errors;
pub mod transport;

pub use client::{ApiError, Client};
pub use config::ClientConfig;
pub use connection::{Connection, ConnectionBuilder, DEFAULT_ENDPOINT};
pub use errors::{ClientError, ConfigError, TransportError};
pub use transport::{HttpTransport, Method, RawResponse};
