//! Statistics reporting.

use console::style;

use crate::download::RunReport;
use crate::scheduler::BatchStats;

/// Print statistics for a single account.
pub fn print_account_stats(mark: &str, report: &RunReport) {
    println!();
    println!("{}", style(format!("Statistics for {}:", mark)).bold());
    println!("  Downloaded: {}", report.downloaded);
    println!("  Skipped:    {} (already satisfied)", report.skipped);
    if report.failed.is_empty() {
        println!("  Failed:     0");
    } else {
        println!("  Failed:     {}", style(report.failed.len()).red());
        for label in &report.failed {
            println!("    {}", style(label).red());
        }
    }
}

/// Print global statistics across all accounts.
pub fn print_batch_stats(stats: &BatchStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Batch statistics:").bold());
    println!("  Accounts processed: {}", stats.accounts_processed);
    if stats.accounts_failed > 0 {
        println!(
            "  Accounts failed:    {}",
            style(stats.accounts_failed).red()
        );
    }
    println!("  Files downloaded:   {}", stats.files_downloaded);
    println!("  Files skipped:      {}", stats.files_skipped);
    if stats.files_failed > 0 {
        println!("  Files failed:       {}", style(stats.files_failed).red());
    }
    println!("{}", style("═".repeat(50)).dim());
}
