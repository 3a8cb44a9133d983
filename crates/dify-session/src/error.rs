//! Error types for the Dify session client

use thiserror::Error;

/// Errors surfaced by the session manager and the request layer.
///
/// Nothing in this crate retries on error; every variant reaches the caller,
/// who decides whether to log in again or abort.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Login rejected: bad credentials, non-success result or malformed body
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Refresh token rejected; a fresh login is required
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Access token could not be decoded
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Non-success HTTP status
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body is not valid JSON
    #[error("Decode error: {0}")]
    Decode(String),

    /// A request was attempted before any login
    #[error("Not authenticated: login is required before issuing requests")]
    NotAuthenticated,

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Missing or invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create an authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        ClientError::Authentication(msg.into())
    }

    /// Create a session-expired error
    pub fn session_expired(msg: impl Into<String>) -> Self {
        ClientError::SessionExpired(msg.into())
    }

    /// Create a malformed-token error
    pub fn malformed_token(msg: impl Into<String>) -> Self {
        ClientError::MalformedToken(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        ClientError::Configuration(msg.into())
    }

    /// Whether recovering from this error means logging in from scratch
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::Authentication(_)
                | ClientError::SessionExpired(_)
                | ClientError::NotAuthenticated
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
