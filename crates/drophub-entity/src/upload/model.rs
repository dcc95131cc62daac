//! Upload entry model and its creation/patch payloads.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drophub_core::types::EntryId;

use super::status::UploadStatus;

/// A file tracked by the upload store.
///
/// An entry lives in the in-memory queue while the file moves through
/// its lifecycle, and survives in the store as history once completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEntry {
    /// Store-assigned identifier, stable for the entry's lifetime.
    pub id: EntryId,
    /// Original file name.
    pub name: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Declared media type (empty when unknown).
    #[serde(default)]
    pub media_type: String,
    /// Current lifecycle status.
    pub status: UploadStatus,
    /// Upload progress, 0–100. Zero while `pending` or `error`, 100
    /// once `completed`.
    pub progress: u8,
    /// When the upload finished. Set only on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Resource locator of the uploaded file. Set only on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl UploadEntry {
    /// Apply a partial update, merging only the supplied fields.
    pub fn apply(&mut self, patch: &UploadPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(uploaded_at) = patch.uploaded_at {
            self.uploaded_at = Some(uploaded_at);
        }
        if let Some(url) = &patch.url {
            self.url = Some(url.clone());
        }
    }
}

/// Data required to create a new upload record.
///
/// The store assigns the id and defaults the new entry to `pending`
/// with zero progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUpload {
    /// Original file name.
    pub name: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Declared media type (empty when unknown).
    #[serde(default)]
    pub media_type: String,
}

impl NewUpload {
    /// Build a creation payload cloning an existing entry's identity
    /// fields. Used by retry and history re-upload; the source entry is
    /// never touched.
    pub fn cloned_from(entry: &UploadEntry) -> Self {
        Self {
            name: entry.name.clone(),
            size_bytes: entry.size_bytes,
            media_type: entry.media_type.clone(),
        }
    }
}

/// Partial update for an upload record.
///
/// `None` fields are left untouched by the store; there is no way to
/// unset `uploaded_at` or `url` through a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadPatch {
    /// New status, if changing.
    pub status: Option<UploadStatus>,
    /// New progress, if changing.
    pub progress: Option<u8>,
    /// Completion timestamp.
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Completion resource locator.
    pub url: Option<String>,
}

impl UploadPatch {
    /// Patch moving an entry to `uploading` at the given progress.
    pub fn uploading(progress: u8) -> Self {
        Self {
            status: Some(UploadStatus::Uploading),
            progress: Some(progress),
            ..Self::default()
        }
    }

    /// Patch marking an entry completed with its final metadata.
    pub fn completed(uploaded_at: DateTime<Utc>, url: String) -> Self {
        Self {
            status: Some(UploadStatus::Completed),
            progress: Some(100),
            uploaded_at: Some(uploaded_at),
            url: Some(url),
        }
    }

    /// Patch reverting a cancelled entry to `pending` with zero progress.
    pub fn reverted() -> Self {
        Self {
            status: Some(UploadStatus::Pending),
            progress: Some(0),
            ..Self::default()
        }
    }

    /// Patch marking a failed entry `error` with zero progress.
    pub fn failed() -> Self {
        Self {
            status: Some(UploadStatus::Error),
            progress: Some(0),
            ..Self::default()
        }
    }
}

/// A file selected by the user but not yet accepted into the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Declared media type (empty when unknown).
    #[serde(default)]
    pub media_type: String,
    /// Queue-local handle to the file payload. Never persisted, and
    /// absent for candidates cloned from history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}
