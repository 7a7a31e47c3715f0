//! `reqwest`-backed [`HttpTransport`].

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use crate::{HttpTransport, Method, RawResponse, TransportError};

pub const DEFAULT_ENDPOINT: &str = "https://rest.faunadb.com";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_millis(4750);

const HOST_HEADER: &str = "X-FaunaDB-Host";
const BUILD_HEADER: &str = "X-FaunaDB-Build";

/// A pooled HTTP connection to the service, authenticated with one secret.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Clone)]
pub struct Connection {
    http: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Connection {
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::default()
    }

    /// A connection using `secret` that shares this connection's pool.
    pub fn with_secret(&self, secret: impl Into<String>) -> Connection {
        Connection {
            http: self.http.clone(),
            endpoint: self.endpoint.clone(),
            secret: secret.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl HttpTransport for Connection {
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<String>,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url(path);
        let data = body.clone().unwrap_or_default();

        let mut request = self
            .http
            .request(method.into(), &url)
            .basic_auth(&self.secret, None::<&str>)
            .query(query);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(body);
        }

        let result = async move {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let headers: BTreeMap<String, String> = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value.to_str().ok().map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
                })
                .collect();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(RawResponse { status, headers, body })
        }
        .await;

        match result {
            Ok(response) => {
                debug!(
                    %method,
                    %url,
                    request = %data,
                    status = response.status,
                    fauna_host = response.header(HOST_HEADER).unwrap_or("Unknown"),
                    fauna_build = response.header(BUILD_HEADER).unwrap_or("Unknown"),
                    response = %response.body,
                    "Request completed"
                );
                Ok(response)
            }
            Err(err) => {
                info!(%method, %url, request = %data, error = %err, "Request failed");
                Err(err.into())
            }
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures a [`Connection`]. Only the secret is required.
#[derive(Debug, Clone)]
pub struct ConnectionBuilder {
    endpoint: String,
    secret: Option<String>,
    connect_timeout: Duration,
    request_timeout: Duration,
    pool_idle_timeout: Duration,
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        ConnectionBuilder {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            secret: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
        }
    }
}

impl ConnectionBuilder {
    /// Base URL of the service; a trailing `/` is ignored.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Connection, TransportError> {
        let secret = self.secret.ok_or(TransportError::MissingSecret)?;
        let http = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .build()?;

        Ok(Connection { http, endpoint: self.endpoint, secret })
    }
}
