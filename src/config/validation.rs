//! Configuration validation and account resolution.

use chrono::{Days, NaiveDate, Utc};
use regex::Regex;

use crate::config::loader::{AccountConfig, Config};
use crate::error::{Error, Result};

/// Date format accepted in account entries.
const DATE_FORMAT: &str = "%Y/%m/%d";

/// Earliest date the platform has any content for.
pub fn platform_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 9, 20).unwrap()
}

fn yesterday() -> NaiveDate {
    let today = Utc::now().date_naive();
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

/// A fully resolved account entry: profile id extracted, date window parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub mark: String,
    pub sec_user_id: String,
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

/// Validate the configuration as a whole.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.accounts.is_empty() {
        return Err(Error::MissingConfig(
            "accounts (at least one account entry required)".to_string(),
        ));
    }

    if config.options.max_workers == 0 {
        return Err(Error::ConfigValidation {
            field: "max_workers".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    if config.options.retry_limit == 0 {
        return Err(Error::ConfigValidation {
            field: "retry_limit".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    Ok(())
}

/// Resolve all configured accounts. Any bad profile URL or inverted date
/// window is a configuration error and aborts the batch before any network
/// traffic happens.
pub fn resolve_accounts(config: &Config) -> Result<Vec<Account>> {
    config.accounts.iter().map(resolve_account).collect()
}

fn resolve_account(entry: &AccountConfig) -> Result<Account> {
    let sec_user_id = extract_sec_user_id(&entry.url)?;
    let earliest = parse_date_or(&entry.earliest, "earliest", platform_epoch());
    let latest = parse_date_or(&entry.latest, "latest", yesterday());

    if earliest > latest {
        return Err(Error::ConfigValidation {
            field: "earliest/latest".to_string(),
            message: format!(
                "date window is inverted for '{}': {} > {}",
                entry.url, earliest, latest
            ),
        });
    }

    Ok(Account {
        mark: entry.mark.clone(),
        sec_user_id,
        earliest,
        latest,
    })
}

/// Extract the `sec_user_id` from a profile URL.
pub fn extract_sec_user_id(url: &str) -> Result<String> {
    let pattern = Regex::new(r"^https://www\.douyin\.com/user/([A-Za-z0-9_-]+)(\?.*)?$").unwrap();

    pattern
        .captures(url.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::ConfigValidation {
            field: "url".to_string(),
            message: format!("could not extract sec_user_id from '{}'", url),
        })
}

/// Parse a `YYYY/MM/DD` date, falling back to `default` for empty or invalid
/// input. Invalid input is reported but tolerated, matching the window
/// defaults rather than aborting the run.
fn parse_date_or(value: &str, field: &str, default: NaiveDate) -> NaiveDate {
    if value.is_empty() {
        return default;
    }
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => date,
        Err(_) => {
            tracing::warn!("Invalid {} date '{}', using {}", field, value, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, earliest: &str, latest: &str) -> AccountConfig {
        AccountConfig {
            mark: String::new(),
            url: url.to_string(),
            earliest: earliest.to_string(),
            latest: latest.to_string(),
        }
    }

    #[test]
    fn test_extract_sec_user_id() {
        assert_eq!(
            extract_sec_user_id("https://www.douyin.com/user/MS4wLjABAAAA_x-y").unwrap(),
            "MS4wLjABAAAA_x-y"
        );
        assert_eq!(
            extract_sec_user_id("https://www.douyin.com/user/abc123?from_tab_name=main").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn test_extract_sec_user_id_invalid() {
        assert!(extract_sec_user_id("https://example.com/user/abc").is_err());
        assert!(extract_sec_user_id("not a url").is_err());
    }

    #[test]
    fn test_date_defaults() {
        let account =
            resolve_account(&entry("https://www.douyin.com/user/abc", "", "")).unwrap();
        assert_eq!(account.earliest, platform_epoch());
        assert_eq!(account.latest, yesterday());
    }

    #[test]
    fn test_date_parsing() {
        let account = resolve_account(&entry(
            "https://www.douyin.com/user/abc",
            "2024/01/10",
            "2024/01/20",
        ))
        .unwrap();
        assert_eq!(account.earliest, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(account.latest, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
    }

    #[test]
    fn test_invalid_date_falls_back() {
        let account = resolve_account(&entry(
            "https://www.douyin.com/user/abc",
            "tomorrow-ish",
            "",
        ))
        .unwrap();
        assert_eq!(account.earliest, platform_epoch());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let err = resolve_account(&entry(
            "https://www.douyin.com/user/abc",
            "2024/02/01",
            "2024/01/01",
        ))
        .unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_validate_config_empty_accounts() {
        let config = Config::default();
        assert!(matches!(
            validate_config(&config).unwrap_err(),
            Error::MissingConfig(_)
        ));
    }
}
