//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Douyin Downloader                                 ║
║     Batch download of published account posts         ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(accounts: usize, save_folder: &str, max_workers: usize) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Accounts:    {}", accounts);
    println!("  Save folder: {}", save_folder);
    println!("  Concurrency: {}", max_workers);
    println!();
}
