//! Table and JSON output for replay reports.

use tabled::Table;

use crate::replay::ReplayReport;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a replay report in the selected format
pub fn print_report(report: &ReplayReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("Share {}", report.share_id);
            if report.tree.is_empty() {
                println!("Root link not cached.");
            } else {
                println!("{}", Table::new(&report.tree));
            }
            print_kv("Batches applied", &report.batches_applied.to_string());
            print_kv("Links", &report.stats.links.to_string());
            print_kv("Decrypted", &report.stats.decrypted.to_string());
            print_kv("Stale", &report.stats.stale.to_string());
            print_kv("Locked", &report.stats.locked.to_string());
            print_kv("Trashed", &join(&report.trashed));
            print_kv("Shared by link", &join(&report.shared_by_link));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a key-value pair
fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
