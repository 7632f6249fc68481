pub mod models;
pub mod error;
pub mod config;
pub mod cli;

/// Browser-driven capture of the server-action token
pub mod harvest;

/// Direct replay of the login request
pub mod client;
pub mod classifier;

/// Orchestration of harvest, replay and classification
pub mod pipeline;

pub use classifier::ResponseClassifier;
pub use client::AuthSessionClient;
pub use config::{PipelineConfig, RetryPolicy};
pub use error::AuthError;
pub use harvest::{BrowserLauncher, BrowserSession, ChromeLauncher, SelectionRule, TokenHarvester};
pub use models::{ActionToken, AuthOutcome, AuthReport, Identity, NetworkObservation, RawAuthResponse};
pub use pipeline::AuthPipeline;
