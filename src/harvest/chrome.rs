// src/harvest/chrome.rs
//! Headless Chrome backend for token harvesting.
//!
//! Every outgoing request of the tab is paused through the CDP Fetch domain,
//! recorded, and immediately continued unmodified, so the page behaves as if
//! nothing were watching.

use headless_chrome::browser::tab::RequestPausedDecision;
use headless_chrome::browser::transport::{SessionId, Transport};
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::{Browser, LaunchOptions, Tab};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BrowserLauncher, BrowserSession};
use crate::config::BrowserConfig;
use crate::error::AuthError;
use crate::models::NetworkObservation;

/// Launches a fresh Chrome process (temporary profile) per session
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    pub headless: bool,

    /// Timeout for element lookups on the login page
    pub timeout: Duration,

    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<PathBuf>,

    pub idle_timeout: Duration,
}

impl Default for ChromeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromeLauncher {
    pub fn new() -> Self {
        Self {
            headless: true,
            timeout: Duration::from_secs(30),
            chrome_path: None,
            idle_timeout: Duration::from_secs(120),
        }
    }

    pub fn from_config(config: &BrowserConfig) -> Self {
        Self::new()
            .headless(config.headless)
            .timeout(Duration::from_secs(config.element_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .chrome_path(config.chrome_path.clone())
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn chrome_path(mut self, path: Option<PathBuf>) -> Self {
        self.chrome_path = path;
        self
    }

    fn launch_browser(&self) -> Result<Browser, AuthError> {
        let mut options = LaunchOptions::default_builder();
        options.headless(self.headless);
        options.idle_browser_timeout(self.idle_timeout);

        if let Some(ref path) = self.chrome_path {
            options.path(Some(path.clone()));
        }

        let options = options
            .build()
            .map_err(|e| AuthError::browser("Failed to build launch options", e))?;

        Browser::new(options)
            .map_err(|e| AuthError::browser("Failed to launch browser. Is Chrome/Chromium installed?", e))
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    fn launch(&self) -> Result<ChromeSession, AuthError> {
        let browser = self.launch_browser()?;
        let tab = browser
            .new_tab()
            .map_err(|e| AuthError::browser("Failed to open tab", e))?;

        let observed: Arc<Mutex<Vec<NetworkObservation>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = observed.clone();

        tab.enable_fetch(None, None)
            .map_err(|e| AuthError::browser("Failed to enable request interception", e))?;
        tab.enable_request_interception(Arc::new(
            move |_transport: Arc<Transport>, _session_id: SessionId, paused: RequestPausedEvent| {
                let request = &paused.params.request;
                let observation = NetworkObservation::new(
                    &request.method,
                    &request.url,
                    header_pairs(&request.headers),
                );
                if let Ok(mut log) = sink.lock() {
                    log.push(observation);
                }
                RequestPausedDecision::Continue(None)
            },
        ))
        .map_err(|e| AuthError::browser("Failed to register request observer", e))?;

        debug!("Browser session started (headless: {})", self.headless);

        Ok(ChromeSession {
            tab,
            observed,
            timeout: self.timeout,
            _browser: browser,
        })
    }
}

/// Flatten CDP request headers into name/value pairs
fn header_pairs<H: serde::Serialize>(headers: &H) -> Vec<(String, String)> {
    match serde_json::to_value(headers) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::String(s) => Some((name, s)),
                serde_json::Value::Null => None,
                other => Some((name, other.to_string())),
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(e) => {
            warn!("Unreadable request headers: {}", e);
            Vec::new()
        }
    }
}

/// A running Chrome process with one observed tab
pub struct ChromeSession {
    tab: Arc<Tab>,
    observed: Arc<Mutex<Vec<NetworkObservation>>>,
    timeout: Duration,
    // owns the Chrome process, dropped after the tab
    _browser: Browser,
}

impl BrowserSession for ChromeSession {
    fn goto(&mut self, url: &str) -> Result<(), AuthError> {
        self.tab
            .navigate_to(url)
            .map_err(|e| AuthError::browser("Navigation failed", e))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| AuthError::browser("Navigation did not complete", e))?;
        Ok(())
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), AuthError> {
        let element = self
            .tab
            .wait_for_element_with_custom_timeout(selector, self.timeout)
            .map_err(|e| AuthError::browser(&format!("Element {} not found", selector), e))?;
        element
            .click()
            .map_err(|e| AuthError::browser(&format!("Could not focus {}", selector), e))?;
        element
            .type_into(value)
            .map_err(|e| AuthError::browser(&format!("Could not type into {}", selector), e))?;
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<(), AuthError> {
        let element = self
            .tab
            .wait_for_element_with_custom_timeout(selector, self.timeout)
            .map_err(|e| AuthError::browser(&format!("Element {} not found", selector), e))?;
        element
            .click()
            .map_err(|e| AuthError::browser(&format!("Could not click {}", selector), e))?;
        Ok(())
    }

    fn observations(&self) -> Vec<NetworkObservation> {
        match self.observed.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        debug!("Closing browser session");
        if let Err(e) = self.tab.close(false) {
            debug!("Tab close failed during teardown: {}", e);
        }
    }
}
