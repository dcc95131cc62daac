//! Completed-upload history.

use std::sync::Arc;

use tracing::warn;

use drophub_core::error::AppError;
use drophub_core::result::AppResult;
use drophub_core::types::EntryId;
use drophub_entity::upload::{UploadEntry, UploadStatus};
use drophub_store::RecordStore;

use crate::queue::UploadQueue;

/// Read-side view over completed uploads in the store.
pub struct HistoryView {
    store: Arc<dyn RecordStore>,
}

impl HistoryView {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Completed uploads, most recent first.
    ///
    /// History is decorative next to the live queue, so a store
    /// failure degrades to an empty list instead of propagating.
    pub async fn load(&self) -> Vec<UploadEntry> {
        match self.store.list(Some(UploadStatus::Completed)).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "failed to load upload history");
                Vec::new()
            }
        }
    }

    /// Queue a completed upload again as a fresh `pending` entry.
    ///
    /// The original record is untouched; the new entry has no local
    /// payload handle.
    pub async fn re_upload(&self, queue: &UploadQueue, id: EntryId) -> AppResult<UploadEntry> {
        let entry = self.store.get(id).await?;
        if entry.status != UploadStatus::Completed {
            return Err(AppError::validation(format!(
                "Upload {id} is {} and cannot be re-uploaded from history",
                entry.status
            )));
        }
        queue.requeue_from(&entry).await
    }

    /// The stored URL of a completed upload, when it has one.
    pub async fn download_url(&self, id: EntryId) -> AppResult<Option<String>> {
        let entry = self.store.get(id).await?;
        Ok(entry.url)
    }
}
