//! Upload policy validation.

use thiserror::Error;

use drophub_core::config::PolicyConfig;
use drophub_core::error::AppError;
use drophub_entity::upload::CandidateFile;

/// Why a candidate file was rejected.
///
/// Messages are user-facing; the CLI prints them verbatim next to the
/// rejected file name.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("File size exceeds {}MB limit. Current size: {:.2}MB", mb(*.max_bytes) as u64, mb(*.actual_bytes))]
    FileTooLarge { actual_bytes: u64, max_bytes: u64 },

    #[error(
        "File type \"{media_type}\" is not allowed. Supported types: images, PDF, Word documents, text files."
    )]
    TypeNotAllowed { media_type: String },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Applies the configured size and media-type policy to candidate
/// files before they enter the queue.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    policy: PolicyConfig,
}

impl UploadValidator {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    /// Check a candidate against the policy. Size is checked before
    /// type, so an oversized file of a disallowed type reports the
    /// size violation.
    pub fn validate(&self, candidate: &CandidateFile) -> Result<(), ValidationError> {
        if candidate.size_bytes > self.policy.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                actual_bytes: candidate.size_bytes,
                max_bytes: self.policy.max_size_bytes,
            });
        }

        if !self
            .policy
            .allowed_media_types
            .iter()
            .any(|t| t == &candidate.media_type)
        {
            let media_type = if candidate.media_type.is_empty() {
                "unknown".to_string()
            } else {
                candidate.media_type.clone()
            };
            return Err(ValidationError::TypeNotAllowed { media_type });
        }

        Ok(())
    }
}
