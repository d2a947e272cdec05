//! Douyin Downloader - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use douyin_downloader::{
    api::{ConfigCredentials, CredentialStore, DouyinApi, QuerySigner},
    cli::Args,
    config::{resolve_accounts, validate_config, Config},
    error::{exit_codes, Error, Result},
    fs::cache_dir,
    ledger::{DownloadRecorder, PendingStore, RECORD_FILE, SNAPSHOT_FILE},
    output::{
        print_banner, print_batch_stats, print_config_summary, print_error, print_info,
        print_warning, IndicatifObserver, NoopObserver, ProgressObserver,
    },
    scheduler::Scheduler,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            let code = match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
                Error::Api(_) | Error::Restricted(_) | Error::Http(_) => exit_codes::API_ERROR,
                Error::Download(_) => exit_codes::DOWNLOAD_ERROR,
                _ => exit_codes::UNEXPECTED_ERROR,
            };
            ExitCode::from(code as u8)
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    // Print banner
    print_banner();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            args.config.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate and resolve accounts before any network traffic
    validate_config(&config)?;
    let accounts = resolve_accounts(&config)?;
    let save_folder = config.save_folder();

    print_config_summary(
        accounts.len(),
        &save_folder.display().to_string(),
        config.options.max_workers,
    );

    if config.cookies.is_empty() {
        print_warning("No session cookies configured; restricted accounts will be inaccessible");
    }

    // API client over the configured session
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(ConfigCredentials::new(config.cookies.clone()));
    let api = Arc::new(DouyinApi::new(
        Arc::clone(&credentials),
        Arc::new(QuerySigner::default()),
        &config.options.user_agent,
        Duration::from_secs(config.options.timeout_seconds),
    )?);

    // The ledger lives in a process-local cache directory so an interrupted
    // run can resume regardless of the working directory.
    let cache = cache_dir()?;
    let recorder = Arc::new(DownloadRecorder::new(cache.join(RECORD_FILE)));
    let pending = PendingStore::new(cache.join(SNAPSHOT_FILE));

    let observer: Arc<dyn ProgressObserver> = if args.quiet {
        Arc::new(NoopObserver)
    } else {
        Arc::new(IndicatifObserver::new())
    };

    let scheduler = Scheduler::new(
        api,
        accounts,
        save_folder,
        &config.options,
        recorder,
        pending,
        credentials,
        observer,
    )?;
    let stats = scheduler.run().await?;

    print_batch_stats(&stats);

    if stats.accounts_failed > 0 {
        return Ok(exit_codes::SOME_ACCOUNTS_FAILED);
    }
    Ok(exit_codes::SUCCESS)
}
