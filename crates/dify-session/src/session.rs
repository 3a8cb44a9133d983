//! Session manager
//!
//! Holds the single credential pair of a client and runs the login and
//! refresh exchanges. Validity is checked lazily: [`SessionManager::ensure_valid`]
//! compares the clock against the stored expiry right before a request and
//! refreshes when `now >= expiry`. There is no background refresh.
//!
//! The credential pair sits behind an async mutex that stays locked for the
//! whole check-and-refresh step, so concurrent callers cannot replay a refresh
//! token that has already been rotated.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, Credentials};
use crate::error::{ClientError, Result};
use crate::token::CredentialPair;

/// Login endpoint path
pub const LOGIN_ENDPOINT: &str = "/console/api/login";

/// Token refresh endpoint path
pub const REFRESH_ENDPOINT: &str = "/auth/refresh";

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    language: &'a str,
    remember_me: bool,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Outcome of a login or refresh call that reached the backend
enum Exchange {
    Granted {
        access_token: String,
        refresh_token: String,
    },
    Rejected(String),
}

/// Manages the authenticated session of one client
pub struct SessionManager {
    http: reqwest::Client,
    config: ClientConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<Option<CredentialPair>>,
}

impl SessionManager {
    /// Create an unauthenticated session manager
    pub fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            clock: Arc::new(SystemClock),
            state: Mutex::new(None),
        }
    }

    /// Replace the clock used for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Log in and install a fresh credential pair.
    ///
    /// A failed login leaves any existing session untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        debug!(email = %credentials.email, "Logging in");

        let request = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
            language: &self.config.language,
            remember_me: self.config.remember_me,
        };

        match self.exchange(LOGIN_ENDPOINT, &request).await? {
            Exchange::Granted {
                access_token,
                refresh_token,
            } => {
                let pair = CredentialPair::from_tokens(access_token, refresh_token, self.clock.now())?;
                info!(expires_at = %pair.expires_at(), "Session established");
                *self.state.lock().await = Some(pair);
                Ok(())
            }
            Exchange::Rejected(reason) => {
                warn!(email = %credentials.email, reason = %reason, "Login failed");
                Err(ClientError::authentication(reason))
            }
        }
    }

    /// Refresh the credential pair unconditionally
    pub async fn refresh(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await
    }

    /// Make sure the session holds an unexpired access token and return it.
    ///
    /// Refreshes exactly once when the token is expired; never touches the
    /// network otherwise.
    pub async fn ensure_valid(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        let expired = match state.as_ref() {
            Some(pair) => pair.is_expired_at(self.clock.now()),
            None => return Err(ClientError::NotAuthenticated),
        };
        debug!(expired, "Checked access token");

        if expired {
            self.refresh_locked(&mut state).await?;
        }

        state
            .as_ref()
            .map(|pair| pair.access_token().to_string())
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Whether a credential pair is installed
    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Expiry of the current access token
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.as_ref().map(CredentialPair::expires_at)
    }

    async fn refresh_locked(&self, state: &mut Option<CredentialPair>) -> Result<()> {
        let current = state.as_ref().ok_or(ClientError::NotAuthenticated)?;
        let request = RefreshRequest {
            refresh_token: current.refresh_token(),
        };

        debug!("Refreshing tokens");
        // Transport failures and 5xx keep the current pair for a later retry
        let outcome = self.exchange(REFRESH_ENDPOINT, &request).await?;

        // The backend answered; the old refresh token is spent either way.
        match outcome {
            Exchange::Granted {
                access_token,
                refresh_token,
            } => match CredentialPair::from_tokens(access_token, refresh_token, self.clock.now()) {
                Ok(pair) => {
                    info!(expires_at = %pair.expires_at(), "Tokens refreshed");
                    *state = Some(pair);
                    Ok(())
                }
                Err(e) => {
                    *state = None;
                    Err(e)
                }
            },
            Exchange::Rejected(reason) => {
                warn!(reason = %reason, "Token refresh rejected; login required");
                *state = None;
                Err(ClientError::session_expired(reason))
            }
        }
    }

    /// POST an auth request and classify the backend's answer.
    ///
    /// 4xx statuses and non-success results are rejections; any other
    /// non-2xx status is a [`ClientError::Http`] error.
    async fn exchange<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Exchange> {
        let url = self.config.url(endpoint);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(url = %url, status = status.as_u16(), "Auth response received");

        if status.is_client_error() {
            return Ok(Exchange::Rejected(format!("status {}: {}", status.as_u16(), text)));
        }
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let document: Value = match serde_json::from_str(&text) {
            Ok(document) => document,
            Err(e) => return Ok(Exchange::Rejected(format!("malformed response: {}", e))),
        };

        let result = document["result"].as_str().unwrap_or_default();
        if result != "success" {
            return Ok(Exchange::Rejected(format!(
                "backend returned result {}",
                document["result"]
            )));
        }

        let data = &document["data"];
        match (data["access_token"].as_str(), data["refresh_token"].as_str()) {
            (Some(access_token), Some(refresh_token)) => Ok(Exchange::Granted {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
            }),
            _ => Ok(Exchange::Rejected(
                "malformed response: missing data.access_token or data.refresh_token".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_shape() {
        let request = LoginRequest {
            email: "ops@example.com",
            password: "secret",
            language: "en-US",
            remember_me: true,
        };
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "email": "ops@example.com",
                "password": "secret",
                "language": "en-US",
                "remember_me": true,
            })
        );
    }

    #[tokio::test]
    async fn test_ensure_valid_requires_login() {
        let session = SessionManager::new(reqwest::Client::new(), ClientConfig::default());

        assert!(!session.is_authenticated().await);
        assert!(session.expires_at().await.is_none());
        assert!(matches!(
            session.ensure_valid().await,
            Err(ClientError::NotAuthenticated)
        ));
        assert!(matches!(
            session.refresh().await,
            Err(ClientError::NotAuthenticated)
        ));
    }
}
