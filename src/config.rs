// src/config.rs
//! Pipeline Configuration
//!
//! YAML-loadable settings for the harvest, replay and retry stages. Every
//! field has a default matching the observed remote service, so an empty
//! file (or no file at all) is a valid configuration.

use anyhow::{anyhow, Context, Result};
use rquest::header::HeaderName;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_LOGIN_URL: &str = "https://login.unity.com/en/sign-in";
pub const DEFAULT_TOKEN_HEADER: &str = "next-action";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Complete pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Login page, also the replay endpoint
    pub login_url: String,

    /// Header carrying the action token (matched case-insensitively)
    pub token_header: String,

    /// Substring a request URL must contain to count as a login submission.
    /// Unset means the path of `login_url`.
    pub login_path_fragment: Option<String>,

    pub harvest: HarvestConfig,
    pub browser: BrowserConfig,
    pub client: ClientConfig,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// CSS selector of the identity input
    pub email_selector: String,

    /// CSS selector of the submit control
    pub submit_selector: String,

    /// Delay after navigation so the page can hydrate
    pub hydration_wait_ms: u64,

    /// Delay after submitting so the token-bearing requests get dispatched
    pub dispatch_wait_ms: u64,

    /// Which qualifying request supplies the token, counted from the end
    /// (1 = last, 2 = second-to-last)
    pub offset_from_end: usize,

    /// Email typed into the form while harvesting. Falls back to the
    /// identity being authenticated.
    pub probe_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,

    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<PathBuf>,

    pub idle_timeout_secs: u64,

    /// How long to wait for the form elements to appear
    pub element_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

/// Orchestrator retry policy. Only an indeterminate outcome is retried,
/// and every retry harvests a fresh token.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            login_path_fragment: None,
            harvest: HarvestConfig::default(),
            browser: BrowserConfig::default(),
            client: ClientConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            email_selector: "#email".to_string(),
            submit_selector: "button[type='submit']".to_string(),
            hydration_wait_ms: 3000,
            dispatch_wait_ms: 5000,
            offset_from_end: 2,
            probe_email: None,
        }
    }
}

impl HarvestConfig {
    pub fn hydration_wait(&self) -> Duration {
        Duration::from_millis(self.hydration_wait_ms)
    }

    pub fn dispatch_wait(&self) -> Duration {
        Duration::from_millis(self.dispatch_wait_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            idle_timeout_secs: 120,
            element_timeout_secs: 30,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 1 }
    }
}

impl PipelineConfig {
    /// Load a configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_yaml(&content)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).with_context(|| "Failed to parse config YAML")
    }

    /// Parsed login URL
    pub fn login_url(&self) -> Result<Url> {
        let url = Url::parse(&self.login_url)
            .with_context(|| format!("Invalid login URL: {}", self.login_url))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(anyhow!("Login URL must be http(s), got scheme '{}'", other)),
        }
    }

    /// Fragment used to recognise login submissions among observed requests
    pub fn login_path_fragment(&self) -> String {
        if let Some(ref fragment) = self.login_path_fragment {
            return fragment.clone();
        }
        match Url::parse(&self.login_url) {
            Ok(url) => url.path().to_string(),
            Err(_) => self.login_url.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.login_url()?;

        if matches!(self.login_path_fragment.as_deref(), Some("")) {
            return Err(anyhow!("login_path_fragment cannot be empty"));
        }

        if self.token_header.trim().is_empty() {
            return Err(anyhow!("token_header cannot be empty"));
        }
        HeaderName::from_bytes(self.token_header.as_bytes())
            .with_context(|| format!("Invalid token header name: {}", self.token_header))?;

        if self.harvest.email_selector.is_empty() {
            return Err(anyhow!("harvest.email_selector cannot be empty"));
        }
        if self.harvest.submit_selector.is_empty() {
            return Err(anyhow!("harvest.submit_selector cannot be empty"));
        }
        if self.harvest.offset_from_end == 0 {
            return Err(anyhow!("harvest.offset_from_end must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(anyhow!("retry.max_attempts must be at least 1"));
        }

        Ok(())
    }
}
