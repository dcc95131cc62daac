//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use drophub_entity::upload::UploadEntry;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Table
    }
}

/// One row of the upload table.
#[derive(Debug, Serialize, Tabled)]
pub struct EntryRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Type")]
    pub media_type: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Progress")]
    pub progress: String,
    #[tabled(rename = "URL")]
    pub url: String,
}

impl From<&UploadEntry> for EntryRow {
    fn from(entry: &UploadEntry) -> Self {
        Self {
            id: entry.id.as_i64(),
            name: entry.name.clone(),
            size: format_size(entry.size_bytes),
            media_type: if entry.media_type.is_empty() {
                "unknown".to_string()
            } else {
                entry.media_type.clone()
            },
            status: entry.status.to_string(),
            progress: format!("{}%", entry.progress),
            url: entry.url.clone().unwrap_or_default(),
        }
    }
}

/// Print upload entries in the selected format
pub fn print_entries(entries: &[UploadEntry], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No results found.");
            } else {
                let rows: Vec<EntryRow> = entries.iter().map(Into::into).collect();
                println!("{}", Table::new(&rows));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Human-readable file size, in 1024-based units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exp = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    // Trim trailing zeros the way `parseFloat(x.toFixed(2))` does.
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exp])
}
