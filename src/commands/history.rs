//! Upload history CLI command.

use clap::Args;

use crate::output::{self, OutputFormat};
use drophub_core::config::AppConfig;
use drophub_core::error::AppError;
use drophub_queue::HistoryView;

/// Arguments for the history command
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Maximum number of entries to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Execute the history command
pub async fn execute(
    args: &HistoryArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::create_store(config)?;
    let history = HistoryView::new(store);

    let mut entries = history.load().await;
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    output::print_entries(&entries, format);
    Ok(())
}
