use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "token-replay")]
#[command(version)]
#[command(about = "Harvests a server-action token from a live login page and replays the sign-in over HTTP.", long_about = None)]
pub struct Args {
    /// Email address to authenticate.
    #[arg(short, long)]
    pub email: String,

    /// YAML configuration file (all fields optional).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the login page / replay endpoint URL.
    #[arg(long)]
    pub login_url: Option<String>,

    /// Substring identifying login submissions (defaults to the login URL's path).
    #[arg(long)]
    pub login_path: Option<String>,

    /// Which token-bearing request to use, counted from the end (1 = last).
    #[arg(long)]
    pub offset: Option<usize>,

    /// Attempts allowed when the outcome is indeterminate (each re-harvests).
    #[arg(long)]
    pub attempts: Option<u32>,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    pub headful: bool,

    /// Path to the Chrome/Chromium executable.
    #[arg(long)]
    pub chrome_path: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut crate::config::PipelineConfig) {
        if let Some(ref url) = self.login_url {
            config.login_url = url.clone();
        }
        if let Some(ref fragment) = self.login_path {
            config.login_path_fragment = Some(fragment.clone());
        }
        if let Some(offset) = self.offset {
            config.harvest.offset_from_end = offset;
        }
        if let Some(attempts) = self.attempts {
            config.retry.max_attempts = attempts;
        }
        if self.headful {
            config.browser.headless = false;
        }
        if let Some(ref path) = self.chrome_path {
            config.browser.chrome_path = Some(path.clone());
        }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[test]
    fn test_overrides_applied() {
        let args = Args::parse_from([
            "token-replay",
            "--email",
            "dev@example.com",
            "--offset",
            "1",
            "--attempts",
            "3",
            "--headful",
            "-vv",
        ]);
        let mut config = PipelineConfig::default();
        args.apply(&mut config);

        assert_eq!(config.harvest.offset_from_end, 1);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(!config.browser.headless);
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn test_login_url_override_moves_path_fragment() {
        let args = Args::parse_from([
            "token-replay",
            "-e",
            "dev@example.com",
            "--login-url",
            "https://auth.example.org/account/signin",
        ]);
        let mut config = PipelineConfig::default();
        args.apply(&mut config);

        assert_eq!(config.login_path_fragment(), "/account/signin");
    }

    #[test]
    fn test_login_path_flag() {
        let args = Args::parse_from(["token-replay", "-e", "dev@example.com", "--login-path", "signin"]);
        let mut config = PipelineConfig::default();
        args.apply(&mut config);

        assert_eq!(config.login_path_fragment(), "signin");
    }

    #[test]
    fn test_defaults_untouched() {
        let args = Args::parse_from(["token-replay", "-e", "dev@example.com"]);
        let mut config = PipelineConfig::default();
        args.apply(&mut config);

        assert_eq!(config.harvest.offset_from_end, 2);
        assert!(config.browser.headless);
        assert_eq!(args.log_filter(), "warn");
    }
}
