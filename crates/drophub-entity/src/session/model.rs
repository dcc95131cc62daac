//! Upload session model.
//!
//! A session groups the entries of one batch upload for aggregate
//! timing and size reporting. It is purely observational and never
//! mutates the entries it references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drophub_core::types::{EntryId, SessionId};

use crate::upload::UploadEntry;

/// A batch of uploads started together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    /// Store-assigned identifier.
    pub id: SessionId,
    /// The entries uploaded in this batch.
    pub entry_ids: Vec<EntryId>,
    /// Combined size of all referenced entries, in bytes.
    pub total_size_bytes: u64,
    /// When the batch began.
    pub started_at: DateTime<Utc>,
    /// When the batch finished. Absent while the batch is running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Data required to open a new upload session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    /// The entries in the batch.
    pub entry_ids: Vec<EntryId>,
    /// Combined size of the batch, in bytes.
    pub total_size_bytes: u64,
}

impl NewSession {
    /// Build a session payload over a batch of entries.
    pub fn for_entries(entries: &[UploadEntry]) -> Self {
        Self {
            entry_ids: entries.iter().map(|e| e.id).collect(),
            total_size_bytes: entries.iter().map(|e| e.size_bytes).sum(),
        }
    }
}
