use anyhow::Context;
use clap::Parser;
use colored::*;
use env_logger::Env;
use log::{error, info};
use rust_token_replay::cli::Args;
use rust_token_replay::{AuthOutcome, AuthPipeline, Identity, PipelineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_filter())).init();

    let mut config = match args.config {
        Some(ref path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let identity = Identity::new(&args.email)?;
    let pipeline = AuthPipeline::with_chrome(&config)?;

    info!("Starting authentication against {}", config.login_url);
    if !args.json {
        println!("{} {}", "Harvesting action token for".bright_cyan(), identity.to_string().bold());
    }

    let report = match pipeline.run_report(&identity).await {
        Ok(report) => report,
        Err(e) => {
            error!("Authentication run failed: {}", e);
            if args.json {
                println!("{}", serde_json::json!({ "identity": identity, "error": e.to_string() }));
            } else {
                eprintln!("{} {}", "ERROR:".red().bold(), e);
            }
            std::process::exit(3);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let label = match report.outcome {
            AuthOutcome::Authenticated => "✓ Login successful".green().bold(),
            AuthOutcome::Rejected => "✗ Login rejected".red().bold(),
            AuthOutcome::Indeterminate => "? Could not determine outcome".yellow().bold(),
        };
        println!("   {}", label);
        println!("   status: {}, attempts: {}", report.status, report.attempts);
    }

    let code = match report.outcome {
        AuthOutcome::Authenticated => 0,
        AuthOutcome::Rejected => 1,
        AuthOutcome::Indeterminate => 2,
    };
    std::process::exit(code);
}
