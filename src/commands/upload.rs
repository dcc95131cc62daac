//! File upload CLI command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;

use crate::output::{self, OutputFormat};
use drophub_core::config::AppConfig;
use drophub_core::error::AppError;
use drophub_entity::upload::CandidateFile;
use drophub_queue::{QueueEvent, UploadQueue};

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the upload command
pub async fn execute(
    args: &UploadArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::create_store(config)?;
    let queue = Arc::new(UploadQueue::new(
        store,
        config.policy.clone(),
        config.simulator.clone(),
    ));

    let mut candidates = Vec::with_capacity(args.files.len());
    for path in &args.files {
        candidates.push(candidate_from_path(path).await?);
    }

    let report = queue.enqueue(candidates).await?;
    for (name, reason) in &report.rejected {
        output::print_warning(&format!("{}: {}", name, reason));
    }
    if report.queued.is_empty() {
        println!("Nothing to upload.");
        return Ok(());
    }

    // Render queue events live while the batch runs.
    let mut events = queue.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                QueueEvent::Progress { id, percent } => {
                    println!("  upload {}: {}%", id, percent);
                }
                QueueEvent::StateChanged { id, to, .. } => {
                    println!("  upload {}: {}", id, to);
                }
                QueueEvent::BatchFinished { .. } => break,
                _ => {}
            }
        }
    });

    let batch = queue.start_all().await?;
    let _ = printer.await;

    for (id, reason) in &batch.failed {
        output::print_warning(&format!("upload {} failed: {}", id, reason));
    }

    output::print_entries(&queue.snapshot().await, format);

    let summary = queue.summary().await;
    output::print_success(&format!(
        "{} of {} uploads completed ({:.0}%, {} transferred)",
        batch.completed,
        summary.total,
        summary.overall_percent,
        output::format_size(summary.completed_bytes)
    ));
    Ok(())
}

/// Build an upload candidate by inspecting a file on disk.
pub async fn candidate_from_path(path: &Path) -> Result<CandidateFile, AppError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        AppError::not_found(format!("File not found: {} ({})", path.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(AppError::validation(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    // Unknown extensions are left untyped; the policy decides whether
    // untyped files are acceptable.
    let media_type = mime_guess::from_path(path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_default();

    Ok(CandidateFile {
        name,
        size_bytes: metadata.len(),
        media_type,
        source: Some(path.to_path_buf()),
    })
}
