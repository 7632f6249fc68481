// src/harvest/mod.rs
//! Action Token Harvesting
//!
//! Drives a real browser through the login page until the page fires its
//! token-bearing server-action request, records every outgoing request of
//! the session, and picks the token out of them.
//!
//! The browser is reached through the `BrowserLauncher` / `BrowserSession`
//! pair. A session releases its browser when dropped, so the process is torn
//! down exactly once on every exit path: success, early failure, an empty
//! capture, or a panic unwinding through `harvest`.

pub mod chrome;
pub mod selection;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use selection::SelectionRule;

use log::{debug, info};
use std::thread;
use std::time::Duration;

use crate::config::{HarvestConfig, PipelineConfig};
use crate::error::AuthError;
use crate::models::{ActionToken, Identity, NetworkObservation};

/// Starts isolated, non-persistent browser sessions
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    fn launch(&self) -> Result<Self::Session, AuthError>;
}

/// A live browser session with a passive observer on its outgoing traffic.
/// Dropping the session releases the browser.
pub trait BrowserSession {
    /// Navigate and wait for the navigation to finish
    fn goto(&mut self, url: &str) -> Result<(), AuthError>;

    /// Type `value` into the element matched by `selector`
    fn fill(&mut self, selector: &str, value: &str) -> Result<(), AuthError>;

    fn click(&mut self, selector: &str) -> Result<(), AuthError>;

    /// Requests observed so far, in dispatch order
    fn observations(&self) -> Vec<NetworkObservation>;
}

/// Produces one action token per invocation. Holds no state between calls.
pub struct TokenHarvester<L> {
    launcher: L,
    login_url: String,
    email_selector: String,
    submit_selector: String,
    hydration_wait: Duration,
    dispatch_wait: Duration,
    rule: SelectionRule,
}

impl<L: BrowserLauncher> TokenHarvester<L> {
    pub fn new(launcher: L, config: &PipelineConfig) -> Self {
        let harvest: &HarvestConfig = &config.harvest;

        Self {
            launcher,
            login_url: config.login_url.clone(),
            email_selector: harvest.email_selector.clone(),
            submit_selector: harvest.submit_selector.clone(),
            hydration_wait: harvest.hydration_wait(),
            dispatch_wait: harvest.dispatch_wait(),
            rule: SelectionRule::new(&config.token_header, &config.login_path_fragment(), harvest.offset_from_end),
        }
    }

    pub fn rule(&self) -> &SelectionRule {
        &self.rule
    }

    /// Render the login page, submit `probe` and capture the action token.
    ///
    /// Blocking: call from `spawn_blocking` inside an async runtime.
    pub fn harvest(&self, probe: &Identity) -> Result<ActionToken, AuthError> {
        let observed = {
            let mut session = self.launcher.launch()?;
            self.drive(&mut session, probe)?;
            session.observations()
            // session dropped here, browser released
        };

        info!("Browser session closed, {} request(s) observed", observed.len());
        self.rule.select(&observed)
    }

    fn drive(&self, session: &mut L::Session, probe: &Identity) -> Result<(), AuthError> {
        debug!("Navigating to {}", self.login_url);
        session.goto(&self.login_url)?;
        pause(self.hydration_wait);

        debug!("Submitting probe identity {} via {}", probe, self.email_selector);
        session.fill(&self.email_selector, probe.as_str())?;
        session.click(&self.submit_selector)?;
        pause(self.dispatch_wait);

        Ok(())
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
