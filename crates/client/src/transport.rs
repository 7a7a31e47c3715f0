//! The HTTP port used by [`crate::Client`].
//!
//! [`HttpTransport`] is the only seam between query logic and the network;
//! [`crate::Connection`] implements it with `reqwest`, tests implement it in
//! memory.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::TransportError;

/// HTTP verbs the service API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
        };
        f.write_str(name)
    }
}

/// A response as received, before any interpretation of the body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    pub status: u16,
    /// Header names are stored lower-cased.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RawResponse {
    /// Looks up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request to the service and returns whatever came back.
///
/// Non-2xx statuses are not errors at this level; only failures to obtain a
/// response at all are.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<String>,
    ) -> Result<RawResponse, TransportError>;

    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<RawResponse, TransportError> {
        self.send(Method::Get, path, query, None).await
    }

    async fn post(&self, path: &str, body: String) -> Result<RawResponse, TransportError> {
        self.send(Method::Post, path, &[], Some(body)).await
    }

    async fn put(&self, path: &str, body: String) -> Result<RawResponse, TransportError> {
        self.send(Method::Put, path, &[], Some(body)).await
    }

    async fn patch(&self, path: &str, body: String) -> Result<RawResponse, TransportError> {
        self.send(Method::Patch, path, &[], Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let response = RawResponse {
            status: 200,
            headers: [("x-faunadb-build".to_string(), "42".to_string())].into_iter().collect(),
            body: String::new(),
        };
        assert_eq!(response.header("X-FaunaDB-Build"), Some("42"));
        assert_eq!(response.header("X-FaunaDB-Host"), None);
        assert!(response.is_success());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
