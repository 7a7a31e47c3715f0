//! Client configuration: a JSON file, overridden by environment variables.
//!
//! ```json
//! { "endpoint": "https://rest.faunadb.com", "secret": "...", "request_timeout_ms": 60000 }
//! ```
//!
//! Every member is optional. `FAUNA_ENDPOINT` and `FAUNA_SECRET` take
//! precedence over the file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConnectionBuilder};

pub const ENDPOINT_VAR: &str = "FAUNA_ENDPOINT";
pub const SECRET_VAR: &str = "FAUNA_SECRET";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Applies `FAUNA_ENDPOINT` and `FAUNA_SECRET` when set.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup(ENDPOINT_VAR) {
            self.endpoint = Some(endpoint);
        }
        if let Some(secret) = lookup(SECRET_VAR) {
            self.secret = Some(secret);
        }
        self
    }

    /// A connection builder with every configured value applied.
    pub fn builder(&self) -> ConnectionBuilder {
        let mut builder = ConnectionBuilder::default();
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.as_str());
        }
        if let Some(secret) = &self.secret {
            builder = builder.secret(secret.as_str());
        }
        if let Some(ms) = self.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.request_timeout_ms {
            builder = builder.request_timeout(Duration::from_millis(ms));
        }
        builder
    }
}
