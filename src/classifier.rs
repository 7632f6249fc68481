// src/classifier.rs
//! Response Classification
//!
//! The login endpoint answers with a framework-specific serialized payload
//! whose verdict is a boolean literal just before the final character.
//! Classification looks only at that suffix. The polarity is inverted:
//! a trailing `false` means the address is *not* unregistered, which the
//! service treats as a successful sign-in.

use log::{debug, info};

use crate::models::{AuthOutcome, RawAuthResponse};

pub struct ResponseClassifier;

impl ResponseClassifier {
    pub fn classify(raw: &RawAuthResponse) -> AuthOutcome {
        debug!("Classifying response: status {}, {} byte body", raw.status, raw.body.len());

        let outcome = Self::classify_body(&raw.body);
        info!("Replay classified as {}", outcome);
        outcome
    }

    /// Pure suffix check on the body text, status is not consulted
    pub fn classify_body(body: &str) -> AuthOutcome {
        let head = without_last_char(body);

        if head.ends_with("false") {
            AuthOutcome::Authenticated
        } else if head.ends_with("true") {
            AuthOutcome::Rejected
        } else {
            AuthOutcome::Indeterminate
        }
    }
}

fn without_last_char(s: &str) -> &str {
    match s.char_indices().next_back() {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
