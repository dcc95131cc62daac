//! Policy dry-run CLI command.

use std::path::PathBuf;

use clap::Args;

use crate::output;
use drophub_core::config::AppConfig;
use drophub_core::error::AppError;
use drophub_queue::UploadValidator;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Files to check against the upload policy
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, config: &AppConfig) -> Result<(), AppError> {
    let validator = UploadValidator::new(config.policy.clone());

    let mut rejected = 0usize;
    for path in &args.files {
        let candidate = super::upload::candidate_from_path(path).await?;
        match validator.validate(&candidate) {
            Ok(()) => {
                let media_type = if candidate.media_type.is_empty() {
                    "unknown"
                } else {
                    candidate.media_type.as_str()
                };
                output::print_success(&format!(
                    "{} ({}, {})",
                    candidate.name,
                    output::format_size(candidate.size_bytes),
                    media_type
                ));
            }
            Err(reason) => {
                rejected += 1;
                output::print_warning(&format!("{}: {}", candidate.name, reason));
            }
        }
    }

    if rejected > 0 {
        return Err(AppError::validation(format!(
            "{} of {} files failed validation",
            rejected,
            args.files.len()
        )));
    }
    Ok(())
}
