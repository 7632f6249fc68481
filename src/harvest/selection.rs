// src/harvest/selection.rs
//! Token selection among observed login submissions.
//!
//! Several POSTs to the login endpoint can carry the token header during a
//! single render. The final one is usually a redundant resend whose value may
//! already be stale, so the default picks the second-to-last. This is a
//! positional heuristic: the offset is configurable and every candidate is
//! logged so a change in the page's request pattern shows up in the logs.

use log::{debug, info};

use crate::error::AuthError;
use crate::models::{ActionToken, NetworkObservation};

/// Which observations qualify and which of them supplies the token
#[derive(Debug, Clone)]
pub struct SelectionRule {
    pub token_header: String,
    pub path_fragment: String,
    /// 1 = last qualifying observation, 2 = second-to-last, ...
    pub offset_from_end: usize,
}

impl SelectionRule {
    pub fn new(token_header: &str, path_fragment: &str, offset_from_end: usize) -> Self {
        Self {
            token_header: token_header.to_string(),
            path_fragment: path_fragment.to_string(),
            offset_from_end,
        }
    }

    pub fn select(&self, observations: &[NetworkObservation]) -> Result<ActionToken, AuthError> {
        let candidates: Vec<&str> = observations
            .iter()
            .filter(|obs| obs.carries_token(&self.path_fragment, &self.token_header))
            .filter_map(|obs| {
                let value = obs.header(&self.token_header)?;
                debug!("Token candidate: {} {} {}={}", obs.method, obs.url, self.token_header, value);
                Some(value)
            })
            .collect();

        debug!(
            "{} of {} observed requests carry '{}'",
            candidates.len(),
            observations.len(),
            self.token_header
        );

        if self.offset_from_end == 0 || candidates.len() < self.offset_from_end {
            return Err(AuthError::TokenNotFound {
                candidates: candidates.len(),
                offset_from_end: self.offset_from_end,
            });
        }

        let index = candidates.len() - self.offset_from_end;
        info!("Selected token candidate {} of {}", index + 1, candidates.len());

        Ok(ActionToken::new(candidates[index]))
    }
}
