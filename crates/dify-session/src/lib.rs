//! Dify Session
//!
//! Authenticated access to the Dify console API. A [`DifyClient`] owns exactly
//! one [`SessionManager`], which logs in with email/password, derives the
//! access-token expiry from the token's own `exp` claim and transparently
//! rotates the credential pair through the refresh endpoint whenever a
//! request finds the access token expired.
//!
//! # Trust Boundary
//!
//! Access tokens are decoded, never verified. The client reads the payload
//! segment only to learn when the token expires; signature checking is left
//! to the backend that issued it.
//!
//! # Example
//!
//! ```rust,no_run
//! use dify_session::{ClientConfig, Credentials, DifyClient};
//!
//! # async fn run() -> dify_session::Result<()> {
//! let client = DifyClient::new(ClientConfig::from_env())?;
//! let credentials = Credentials::from_env()?;
//! client.login(&credentials).await?;
//!
//! let nodes = client.node_executions("app-id", "run-id").await?;
//! println!("{}", nodes);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod session;
pub mod token;

pub use client::DifyClient;
pub use config::{ClientConfig, Credentials};
pub use error::{ClientError, Result};
pub use session::{Clock, SessionManager, SystemClock};
pub use token::{decode_claims, CredentialPair};
