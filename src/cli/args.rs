//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{AccountConfig, Config};

/// Douyin post downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "douyin-downloader",
    version,
    about = "Download published posts from Douyin accounts",
    long_about = "A CLI tool to download the published videos and image galleries of \
                  Douyin accounts.\n\n\
                  Accounts, cookies and options normally come from a TOML config file; \
                  every flag here overrides its counterpart in the file."
)]
pub struct Args {
    /// Account profile URL(s) to download from, overriding the config file.
    /// Can specify multiple URLs separated by spaces.
    #[arg(short, long, value_delimiter = ' ', num_args = 1..)]
    pub url: Option<Vec<String>>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub save_folder: Option<PathBuf>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "DOUYIN_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Concurrent download limit.
    #[arg(short = 'w', long = "max-workers")]
    pub max_workers: Option<usize>,

    /// Retry attempts per page fetch and per download.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Earliest publish date to keep (YYYY/MM/DD), applied to every account.
    #[arg(long)]
    pub earliest: Option<String>,

    /// Latest publish date to keep (YYYY/MM/DD), applied to every account.
    #[arg(long)]
    pub latest: Option<String>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Hide per-file progress bars and skip notices.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(urls) = &self.url {
            config.accounts = urls
                .iter()
                .map(|url| AccountConfig {
                    url: url.clone(),
                    ..Default::default()
                })
                .collect();
        }

        if let Some(dir) = &self.save_folder {
            config.save_folder = Some(dir.clone());
        }

        if let Some(user_agent) = &self.user_agent {
            config.options.user_agent = user_agent.clone();
        }

        if let Some(workers) = self.max_workers {
            config.options.max_workers = workers;
        }

        if let Some(retries) = self.retries {
            config.options.retry_limit = retries;
        }

        if let Some(earliest) = &self.earliest {
            for account in &mut config.accounts {
                account.earliest = earliest.clone();
            }
        }

        if let Some(latest) = &self.latest {
            for account in &mut config.accounts {
                account.latest = latest.clone();
            }
        }

        if self.quiet {
            config.options.show_skipped = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_from(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_url_override_replaces_accounts() {
        let mut config = Config {
            accounts: vec![AccountConfig {
                url: "https://www.douyin.com/user/old".into(),
                mark: "old".into(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let args = args_from(&[
            "douyin-downloader",
            "-u",
            "https://www.douyin.com/user/new",
        ]);
        args.merge_into_config(&mut config);

        assert_eq!(config.accounts.len(), 1);
        assert_eq!(config.accounts[0].url, "https://www.douyin.com/user/new");
        assert!(config.accounts[0].mark.is_empty());
    }

    #[test]
    fn test_window_flags_apply_to_all_accounts() {
        let mut config = Config {
            accounts: vec![
                AccountConfig {
                    url: "https://www.douyin.com/user/a".into(),
                    ..Default::default()
                },
                AccountConfig {
                    url: "https://www.douyin.com/user/b".into(),
                    earliest: "2020/01/01".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let args = args_from(&["douyin-downloader", "--earliest", "2024/06/01"]);
        args.merge_into_config(&mut config);

        assert!(config
            .accounts
            .iter()
            .all(|a| a.earliest == "2024/06/01"));
    }

    #[test]
    fn test_quiet_suppresses_skip_notices() {
        let mut config = Config::default();
        assert!(config.options.show_skipped);

        let args = args_from(&["douyin-downloader", "-q"]);
        args.merge_into_config(&mut config);
        assert!(!config.options.show_skipped);
    }

    #[test]
    fn test_numeric_overrides() {
        let mut config = Config::default();
        let args = args_from(&["douyin-downloader", "-w", "2", "--retries", "9"]);
        args.merge_into_config(&mut config);
        assert_eq!(config.options.max_workers, 2);
        assert_eq!(config.options.retry_limit, 9);
    }
}
