//! Configuration structures and loading logic.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Accounts whose published posts should be downloaded.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Base directory for downloads. Defaults to the current directory.
    #[serde(default)]
    pub save_folder: Option<PathBuf>,

    /// Session cookie blob, used verbatim in request parameters.
    /// The `msToken` entry, when present, is attached to every metadata call.
    #[serde(default)]
    pub cookies: HashMap<String, String>,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// One account entry from the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Display label for the account. May be empty; falls back to the
    /// nickname resolved from the first fetched post.
    #[serde(default)]
    pub mark: String,

    /// Profile URL, e.g. `https://www.douyin.com/user/<sec_user_id>`.
    pub url: String,

    /// Earliest publish date to keep, `YYYY/MM/DD`. Empty means the
    /// platform epoch.
    #[serde(default)]
    pub earliest: String,

    /// Latest publish date to keep, `YYYY/MM/DD`. Empty means yesterday.
    #[serde(default)]
    pub latest: String,
}

/// Fields available for generated file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameField {
    /// Publish date, formatted `YYYY-MM-DD`.
    CreateTime,
    /// Post id.
    Id,
    /// Media kind label (gallery or video).
    Type,
    /// Cleaned, length-capped description.
    Desc,
}

/// Tunable options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Concurrent download task limit.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Attempts per page fetch and per download task.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum characters of a post description kept in file names.
    #[serde(default = "default_description_length")]
    pub description_length: usize,

    /// Field order for generated file names.
    #[serde(default = "default_name_format")]
    pub name_format: Vec<NameField>,

    /// Separator between file name fields.
    #[serde(default = "default_separator")]
    pub name_separator: String,

    /// Seconds between credential refreshes during long download batches.
    #[serde(default = "default_refresh_interval")]
    pub cookie_refresh_seconds: u64,

    /// Whether to log skipped (already downloaded) files.
    #[serde(default = "default_true")]
    pub show_skipped: bool,

    /// Browser user agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            retry_limit: default_retry_limit(),
            timeout_seconds: default_timeout(),
            description_length: default_description_length(),
            name_format: default_name_format(),
            name_separator: default_separator(),
            cookie_refresh_seconds: default_refresh_interval(),
            show_skipped: true,
            user_agent: default_user_agent(),
        }
    }
}

fn default_max_workers() -> usize {
    5
}

fn default_retry_limit() -> u32 {
    5
}

fn default_timeout() -> u64 {
    10
}

fn default_description_length() -> usize {
    64
}

fn default_name_format() -> Vec<NameField> {
    vec![
        NameField::CreateTime,
        NameField::Id,
        NameField::Type,
        NameField::Desc,
    ]
}

fn default_separator() -> String {
    "-".to_string()
}

fn default_refresh_interval() -> u64 {
    10 * 60
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the effective save folder.
    pub fn save_folder(&self) -> PathBuf {
        self.save_folder
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
