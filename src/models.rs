use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// Ephemeral server-action token captured from a login-page render.
/// Valid for at most one productive replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionToken(String);

impl ActionToken {
    pub fn new(value: impl Into<String>) -> Self {
        ActionToken(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Email address being authenticated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Trims the input and requires a non-empty address containing `@`
    pub fn new(email: &str) -> Result<Self, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidIdentity("email is required".to_string()));
        }
        if !email.contains('@') {
            return Err(AuthError::InvalidIdentity(format!("'{}' is not an email address", email)));
        }
        Ok(Identity(email.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outgoing request seen while the browser rendered the login page.
/// Header names are stored lower-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkObservation {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
}

impl NetworkObservation {
    pub fn new<I, K, V>(method: &str, url: &str, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        NetworkObservation {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// A POST to a URL containing `path_fragment` that carries a non-empty `token_header`
    pub fn carries_token(&self, path_fragment: &str, token_header: &str) -> bool {
        self.method.eq_ignore_ascii_case("POST")
            && self.url.contains(path_fragment)
            && self.header(token_header).map_or(false, |v| !v.is_empty())
    }
}

/// Unparsed status and body of the replayed login request
#[derive(Debug, Clone, PartialEq)]
pub struct RawAuthResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    Authenticated,
    Rejected,
    Indeterminate,
}

impl AuthOutcome {
    /// The boolean handed to downstream systems. Only a confirmed
    /// authentication counts.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthOutcome::Authenticated => "authenticated",
            AuthOutcome::Rejected => "rejected",
            AuthOutcome::Indeterminate => "indeterminate",
        };
        f.write_str(label)
    }
}

/// Outcome of a pipeline run together with how it was reached
#[derive(Debug, Clone, Serialize)]
pub struct AuthReport {
    pub identity: Identity,
    pub outcome: AuthOutcome,
    /// HTTP status of the response that was classified
    pub status: u16,
    pub attempts: u32,
}
