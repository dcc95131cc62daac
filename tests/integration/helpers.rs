//! Shared helpers for queue integration tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use drophub_core::config::{PolicyConfig, SimulatorConfig};
use drophub_core::error::AppError;
use drophub_core::result::AppResult;
use drophub_core::types::{EntryId, SessionId};
use drophub_entity::session::{NewSession, UploadSession};
use drophub_entity::upload::{CandidateFile, NewUpload, UploadEntry, UploadPatch, UploadStatus};
use drophub_queue::UploadQueue;
use drophub_store::{MemoryStore, RecordStore};

/// A queue over a fresh in-memory store with default policy and cadence.
pub fn test_queue() -> (Arc<UploadQueue>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(UploadQueue::new(
        store.clone(),
        PolicyConfig::default(),
        SimulatorConfig::default(),
    ));
    (queue, store)
}

/// A queue over a store whose first `failures` update calls fail.
pub fn flaky_queue(failures: usize) -> (Arc<UploadQueue>, Arc<FlakyStore>) {
    flaky_store_queue(FlakyStore::failing_updates(failures))
}

/// A queue over a store that refuses the `nth` create call.
pub fn flaky_create_queue(nth: usize) -> (Arc<UploadQueue>, Arc<FlakyStore>) {
    flaky_store_queue(FlakyStore::failing_create(nth))
}

fn flaky_store_queue(store: FlakyStore) -> (Arc<UploadQueue>, Arc<FlakyStore>) {
    let store = Arc::new(store);
    let queue = Arc::new(UploadQueue::new(
        store.clone(),
        PolicyConfig::default(),
        SimulatorConfig::default(),
    ));
    (queue, store)
}

pub fn candidate(name: &str, size_bytes: u64, media_type: &str) -> CandidateFile {
    CandidateFile {
        name: name.to_string(),
        size_bytes,
        media_type: media_type.to_string(),
        source: None,
    }
}

pub fn candidate_with_source(name: &str, size_bytes: u64, media_type: &str) -> CandidateFile {
    CandidateFile {
        source: Some(PathBuf::from(format!("/tmp/{name}"))),
        ..candidate(name, size_bytes, media_type)
    }
}

/// Wraps a [`MemoryStore`] and fails a configured slice of calls, then
/// recovers. Everything else passes straight through.
pub struct FlakyStore {
    inner: MemoryStore,
    update_failures_left: AtomicUsize,
    /// 1-based index of the create call to refuse; 0 refuses none.
    failing_create_call: usize,
    create_calls: AtomicUsize,
}

impl FlakyStore {
    /// Fails the first `failures` update calls.
    pub fn failing_updates(failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            update_failures_left: AtomicUsize::new(failures),
            failing_create_call: 0,
            create_calls: AtomicUsize::new(0),
        }
    }

    /// Fails only the `nth` create call.
    pub fn failing_create(nth: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            update_failures_left: AtomicUsize::new(0),
            failing_create_call: nth,
            create_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn list(&self, filter: Option<UploadStatus>) -> AppResult<Vec<UploadEntry>> {
        self.inner.list(filter).await
    }

    async fn get(&self, id: EntryId) -> AppResult<UploadEntry> {
        self.inner.get(id).await
    }

    async fn create(&self, new: NewUpload) -> AppResult<UploadEntry> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.failing_create_call {
            return Err(AppError::store("Record store unavailable"));
        }
        self.inner.create(new).await
    }

    async fn update(&self, id: EntryId, patch: UploadPatch) -> AppResult<UploadEntry> {
        let left = self.update_failures_left.load(Ordering::SeqCst);
        if left > 0
            && self
                .update_failures_left
                .compare_exchange(left, left - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            return Err(AppError::store("Record store unavailable"));
        }
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: EntryId) -> AppResult<()> {
        self.inner.delete(id).await
    }

    async fn create_session(&self, new: NewSession) -> AppResult<UploadSession> {
        self.inner.create_session(new).await
    }

    async fn complete_session(&self, id: SessionId) -> AppResult<UploadSession> {
        self.inner.complete_session(id).await
    }
}

/// A store that refuses every call, for degradation tests.
pub struct BrokenStore;

#[async_trait]
impl RecordStore for BrokenStore {
    async fn list(&self, _filter: Option<UploadStatus>) -> AppResult<Vec<UploadEntry>> {
        Err(AppError::store("Record store unavailable"))
    }

    async fn get(&self, _id: EntryId) -> AppResult<UploadEntry> {
        Err(AppError::store("Record store unavailable"))
    }

    async fn create(&self, _new: NewUpload) -> AppResult<UploadEntry> {
        Err(AppError::store("Record store unavailable"))
    }

    async fn update(&self, _id: EntryId, _patch: UploadPatch) -> AppResult<UploadEntry> {
        Err(AppError::store("Record store unavailable"))
    }

    async fn delete(&self, _id: EntryId) -> AppResult<()> {
        Err(AppError::store("Record store unavailable"))
    }

    async fn create_session(&self, _new: NewSession) -> AppResult<UploadSession> {
        Err(AppError::store("Record store unavailable"))
    }

    async fn complete_session(&self, _id: SessionId) -> AppResult<UploadSession> {
        Err(AppError::store("Record store unavailable"))
    }
}
