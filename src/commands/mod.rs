//! CLI command definitions and dispatch.

pub mod history;
pub mod upload;
pub mod validate;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use drophub_core::config::{AppConfig, StoreBackend};
use drophub_core::error::AppError;
use drophub_store::{HttpStore, MemoryStore, RecordStore};

/// DropHub — Upload Queue Manager
#[derive(Debug, Parser)]
#[command(name = "drophub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Queue files and run the upload batch
    Upload(upload::UploadArgs),
    /// Show completed upload history
    History(history::HistoryArgs),
    /// Check files against the upload policy without queueing them
    Validate(validate::ValidateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Upload(args) => upload::execute(args, config, self.format).await,
            Commands::History(args) => history::execute(args, config, self.format).await,
            Commands::Validate(args) => validate::execute(args, config).await,
        }
    }
}

/// Helper: build the configured record store backend
pub fn create_store(config: &AppConfig) -> Result<Arc<dyn RecordStore>, AppError> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Http => Ok(Arc::new(HttpStore::new(&config.store.http)?)),
    }
}
