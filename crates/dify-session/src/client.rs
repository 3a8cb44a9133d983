//! Authenticated request layer
//!
//! Every verb runs the session's validity check first (which may refresh the
//! token once), sends the bearer token, and returns the response body as an
//! untyped JSON document. Non-success statuses come back as
//! [`ClientError::Http`]; nothing is retried, cached or paginated.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, Credentials};
use crate::error::{ClientError, Result};
use crate::session::{Clock, SessionManager};

/// Dify console API client bound to one session
pub struct DifyClient {
    http: reqwest::Client,
    session: SessionManager,
}

impl DifyClient {
    /// Create a client with its own HTTP connection pool
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http(http, config))
    }

    /// Create a client on top of an existing HTTP client
    pub fn with_http(http: reqwest::Client, config: ClientConfig) -> Self {
        let session = SessionManager::new(http.clone(), config);
        Self { http, session }
    }

    /// Replace the clock the session uses for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.session = self.session.with_clock(clock);
        self
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        self.session.config()
    }

    /// Log in with the given credentials
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.session.login(credentials).await
    }

    /// GET `endpoint`, with query parameters when `query` is non-empty
    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.send(Method::GET, endpoint, query, None).await
    }

    /// POST an optional JSON body to `endpoint`
    pub async fn post(&self, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        self.send(Method::POST, endpoint, &[], body).await
    }

    /// PUT an optional JSON body to `endpoint`
    pub async fn put(&self, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        self.send(Method::PUT, endpoint, &[], body).await
    }

    /// DELETE `endpoint`
    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.send(Method::DELETE, endpoint, &[], None).await
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let access_token = self.session.ensure_valid().await?;
        let url = self.config().url(endpoint);

        debug!(method = %method, url = %url, query = ?query, has_body = body.is_some(), "Sending request");

        let mut request = self.http.request(method.clone(), &url).bearer_auth(&access_token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(method = %method, url = %url, status = status.as_u16(), bytes = text.len(), "Response received");

        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
