// src/client.rs
//! Browser-less replay of the login request.
//!
//! Sends one POST carrying a harvested action token, with the provenance
//! headers (Origin, Referer, User-Agent) a real browser on the login domain
//! would send. The response is returned verbatim; interpretation belongs to
//! the classifier.

use log::debug;
use rquest::header::{self, HeaderName, HeaderValue};
use rquest::Client;
use rquest_util::Emulation;
use serde_json::json;
use url::Url;

use crate::config::PipelineConfig;
use crate::error::AuthError;
use crate::models::{ActionToken, Identity, RawAuthResponse};

pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=UTF-8";

pub struct AuthSessionClient {
    client: Client,
    login_url: Url,
    origin: String,
    token_header: HeaderName,
    user_agent: String,
}

impl AuthSessionClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, AuthError> {
        let login_url = config
            .login_url()
            .map_err(|e| AuthError::Config(format!("{:#}", e)))?;
        let token_header = HeaderName::from_bytes(config.token_header.as_bytes())
            .map_err(|e| AuthError::Config(format!("invalid token header '{}': {}", config.token_header, e)))?;

        // TLS/HTTP2 fingerprint matching the Chrome User-Agent we send
        let client = Client::builder()
            .emulation(Emulation::Chrome126)
            .timeout(config.client.timeout())
            .build()?;

        Ok(Self {
            origin: login_url.origin().ascii_serialization(),
            client,
            login_url,
            token_header,
            user_agent: config.client.user_agent.clone(),
        })
    }

    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The identity as a single-element JSON array, e.g. `["dev@example.com"]`
    pub fn request_body(identity: &Identity) -> String {
        json!([identity.as_str()]).to_string()
    }

    /// One POST, no retry. Connection failures and timeouts surface as
    /// `AuthError::Network`; a token unusable as a header value as
    /// `AuthError::InvalidToken` before anything is sent.
    pub async fn authenticate(&self, identity: &Identity, token: &ActionToken) -> Result<RawAuthResponse, AuthError> {
        let token_value = HeaderValue::from_str(token.as_str())
            .map_err(|e| AuthError::InvalidToken(format!("{:?}: {}", token.as_str(), e)))?;
        let body = Self::request_body(identity);
        debug!("Replaying login for {} against {}", identity, self.login_url);

        let resp = self
            .client
            .post(self.login_url.as_str())
            .header(self.token_header.clone(), token_value)
            .header(header::CONTENT_TYPE, CONTENT_TYPE_TEXT)
            .header(header::USER_AGENT, self.user_agent.as_str())
            .header(header::ACCEPT, "*/*")
            .header(header::ORIGIN, self.origin.as_str())
            .header(header::REFERER, self.login_url.as_str())
            .body(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!("Replay answered {} with {} bytes", status, body.len());

        Ok(RawAuthResponse { status, body })
    }
}
