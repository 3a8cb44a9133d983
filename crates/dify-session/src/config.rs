//! Client configuration
//!
//! Values come from defaults, the environment, or the `with_*` builders.
//!
//! Environment variables:
//! - `DIFY_BASE_URL`: console base URL (default `http://dify.dify-system.svc`)
//! - `DIFY_LANGUAGE`: language sent with the login request (default `en-US`)
//! - `DIFY_REMEMBER_ME`: `remember_me` flag sent with the login request
//! - `DIFY_TIMEOUT_MS`: per-request timeout in milliseconds
//! - `DIFY_EMAIL` / `DIFY_PASSWORD`: login credentials

use std::fmt;
use std::time::Duration;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ClientError, Result};

/// Default console address inside the cluster
pub const DEFAULT_BASE_URL: &str = "http://dify.dify-system.svc";

/// Default login language
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`DifyClient`](crate::DifyClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Language reported at login
    pub language: String,
    /// `remember_me` flag reported at login
    pub remember_me: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            remember_me: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            base_url: lookup("DIFY_BASE_URL")
                .map(|url| normalize_base_url(&url))
                .unwrap_or(defaults.base_url),
            language: lookup("DIFY_LANGUAGE").unwrap_or(defaults.language),
            remember_me: lookup("DIFY_REMEMBER_ME")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.remember_me),
            timeout: lookup("DIFY_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Set the backend base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&base_url.into());
        self
    }

    /// Set the login language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the `remember_me` login flag
    pub fn with_remember_me(mut self, remember_me: bool) -> Self {
        self.remember_me = remember_me;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Console login credentials
///
/// The password is wiped from memory on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Read `DIFY_EMAIL` and `DIFY_PASSWORD`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let email = lookup("DIFY_EMAIL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ClientError::configuration("DIFY_EMAIL is not set"))?;
        let password = lookup("DIFY_PASSWORD")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ClientError::configuration("DIFY_PASSWORD is not set"))?;

        Ok(Self { email, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
