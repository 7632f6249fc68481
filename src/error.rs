// src/error.rs
//! Failure taxonomy for the token harvest / replay pipeline.
//!
//! An `Indeterminate` classification is not represented here: it is a
//! regular outcome, not a failure.

use thiserror::Error;

/// Errors that end a single authentication run
#[derive(Error, Debug)]
pub enum AuthError {
    /// No qualifying request was observed during the browser session,
    /// or fewer than the selection offset requires.
    #[error("action token not found ({candidates} qualifying request(s) observed, offset {offset_from_end})")]
    TokenNotFound {
        candidates: usize,
        offset_from_end: usize,
    },

    /// Connection failure or timeout while replaying the login request
    #[error("network error during replay: {0}")]
    Network(#[from] rquest::Error),

    /// The browser could not be launched or driven through the login page
    #[error("browser session failed: {0}")]
    Browser(String),

    /// The harvested token cannot be sent as an HTTP header value
    #[error("invalid action token: {0}")]
    InvalidToken(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The blocking harvest task panicked or was cancelled
    #[error("harvest task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

impl AuthError {
    pub fn browser(context: &str, err: impl std::fmt::Display) -> Self {
        AuthError::Browser(format!("{}: {}", context, err))
    }
}
