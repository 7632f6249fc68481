// src/pipeline.rs
//! Harvest -> replay -> classify orchestration.
//!
//! Each run obtains its own token; nothing is cached between runs, so
//! concurrent runs for different identities share no state. A retry (when
//! the policy allows one) always starts from a fresh harvest.

use log::{info, warn};
use std::sync::Arc;

use crate::classifier::ResponseClassifier;
use crate::client::AuthSessionClient;
use crate::config::{PipelineConfig, RetryPolicy};
use crate::error::AuthError;
use crate::harvest::{BrowserLauncher, ChromeLauncher, TokenHarvester};
use crate::models::{AuthOutcome, AuthReport, Identity};

pub struct AuthPipeline<L> {
    harvester: Arc<TokenHarvester<L>>,
    client: AuthSessionClient,
    retry: RetryPolicy,
    probe: Option<Identity>,
}

impl AuthPipeline<ChromeLauncher> {
    /// Pipeline backed by a local Chrome/Chromium install
    pub fn with_chrome(config: &PipelineConfig) -> Result<Self, AuthError> {
        Self::new(ChromeLauncher::from_config(&config.browser), config)
    }
}

impl<L> AuthPipeline<L>
where
    L: BrowserLauncher + 'static,
{
    pub fn new(launcher: L, config: &PipelineConfig) -> Result<Self, AuthError> {
        config
            .validate()
            .map_err(|e| AuthError::Config(format!("{:#}", e)))?;

        let probe = match config.harvest.probe_email.as_deref() {
            Some(email) => Some(Identity::new(email)?),
            None => None,
        };

        Ok(Self {
            harvester: Arc::new(TokenHarvester::new(launcher, config)),
            client: AuthSessionClient::new(config)?,
            retry: config.retry,
            probe,
        })
    }

    /// Authenticate `identity` and return only the classified outcome
    pub async fn run(&self, identity: &Identity) -> Result<AuthOutcome, AuthError> {
        Ok(self.run_report(identity).await?.outcome)
    }

    pub async fn run_report(&self, identity: &Identity) -> Result<AuthReport, AuthError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            info!("Authentication attempt {}/{} for {}", attempt, max_attempts, identity);

            let probe = self.probe.clone().unwrap_or_else(|| identity.clone());
            let harvester = self.harvester.clone();
            // Browser driving is blocking. If this future is dropped the task
            // still runs to completion and releases the browser itself.
            let token = tokio::task::spawn_blocking(move || harvester.harvest(&probe)).await??;

            let raw = self.client.authenticate(identity, &token).await?;
            let outcome = ResponseClassifier::classify(&raw);

            if outcome == AuthOutcome::Indeterminate && attempt < max_attempts {
                warn!("Attempt {} was indeterminate (status {}), re-harvesting token", attempt, raw.status);
                continue;
            }

            return Ok(AuthReport {
                identity: identity.clone(),
                outcome,
                status: raw.status,
                attempts: attempt,
            });
        }
    }
}
