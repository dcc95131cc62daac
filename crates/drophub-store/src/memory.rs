//! In-memory record store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use drophub_core::error::AppError;
use drophub_core::result::AppResult;
use drophub_core::types::{EntryId, SessionId};
use drophub_entity::session::{NewSession, UploadSession};
use drophub_entity::upload::{NewUpload, UploadEntry, UploadPatch, UploadStatus};

use crate::store::RecordStore;

/// An in-process [`RecordStore`] backed by hash maps.
///
/// Used by the test suite and as the default CLI backend, so the queue
/// works without a hosted record store. Ids are assigned from a
/// monotonically increasing counter per collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<i64, UploadEntry>>,
    sessions: RwLock<HashMap<i64, UploadSession>>,
    next_entry_id: AtomicI64,
    next_session_id: AtomicI64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, filter: Option<UploadStatus>) -> AppResult<Vec<UploadEntry>> {
        let entries = self.entries.read().await;
        let mut result: Vec<UploadEntry> = entries
            .values()
            .filter(|e| filter.is_none_or(|status| e.status == status))
            .cloned()
            .collect();

        // Completed listings order by completion time, everything else
        // by creation time. Ids break timestamp ties deterministically.
        if filter == Some(UploadStatus::Completed) {
            result.sort_by(|a, b| (b.uploaded_at, b.id).cmp(&(a.uploaded_at, a.id)));
        } else {
            result.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        }
        Ok(result)
    }

    async fn get(&self, id: EntryId) -> AppResult<UploadEntry> {
        self.entries
            .read()
            .await
            .get(&id.as_i64())
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Upload {id} not found")))
    }

    async fn create(&self, new: NewUpload) -> AppResult<UploadEntry> {
        let id = self.next_entry_id.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = UploadEntry {
            id: EntryId::from_raw(id),
            name: new.name,
            size_bytes: new.size_bytes,
            media_type: new.media_type,
            status: UploadStatus::Pending,
            progress: 0,
            uploaded_at: None,
            url: None,
            created_at: Utc::now(),
        };
        self.entries.write().await.insert(id, entry.clone());
        Ok(entry)
    }

    async fn update(&self, id: EntryId, patch: UploadPatch) -> AppResult<UploadEntry> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(&id.as_i64())
            .ok_or_else(|| AppError::not_found(format!("Upload {id} not found")))?;
        entry.apply(&patch);
        Ok(entry.clone())
    }

    async fn delete(&self, id: EntryId) -> AppResult<()> {
        self.entries
            .write()
            .await
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Upload {id} not found")))
    }

    async fn create_session(&self, new: NewSession) -> AppResult<UploadSession> {
        let id = self.next_session_id.fetch_add(1, Ordering::SeqCst) + 1;
        let session = UploadSession {
            id: SessionId::from_raw(id),
            entry_ids: new.entry_ids,
            total_size_bytes: new.total_size_bytes,
            started_at: Utc::now(),
            completed_at: None,
        };
        self.sessions.write().await.insert(id, session.clone());
        Ok(session)
    }

    async fn complete_session(&self, id: SessionId) -> AppResult<UploadSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id.as_i64())
            .ok_or_else(|| AppError::not_found(format!("Session {id} not found")))?;
        session.completed_at = Some(Utc::now());
        Ok(session.clone())
    }
}
