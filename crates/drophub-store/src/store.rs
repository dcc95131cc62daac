//! The record store client trait.

use async_trait::async_trait;

use drophub_core::result::AppResult;
use drophub_core::types::{EntryId, SessionId};
use drophub_entity::session::{NewSession, UploadSession};
use drophub_entity::upload::{NewUpload, UploadEntry, UploadPatch, UploadStatus};

/// Asynchronous CRUD interface over the persistent upload collection.
///
/// Implementations shape requests and responses only; all business
/// logic lives in the queue controller. Transport failures surface as
/// a single `ErrorKind::Store` error, so callers never see
/// transport-specific detail.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// List upload records, optionally filtered by status.
    ///
    /// Unfiltered listings are ordered by creation time descending;
    /// completed-filtered listings by `uploaded_at` descending.
    async fn list(&self, filter: Option<UploadStatus>) -> AppResult<Vec<UploadEntry>>;

    /// Fetch a single record by id. Fails with `NotFound` when absent.
    async fn get(&self, id: EntryId) -> AppResult<UploadEntry>;

    /// Create a new record. The store assigns the id and defaults the
    /// entry to `pending` with zero progress.
    async fn create(&self, new: NewUpload) -> AppResult<UploadEntry>;

    /// Merge the supplied fields into an existing record; unset patch
    /// fields are left untouched. Fails with `NotFound` when absent.
    async fn update(&self, id: EntryId, patch: UploadPatch) -> AppResult<UploadEntry>;

    /// Delete a record. Fails with `NotFound` when absent.
    async fn delete(&self, id: EntryId) -> AppResult<()>;

    /// Open an upload session grouping a batch of entries.
    async fn create_session(&self, new: NewSession) -> AppResult<UploadSession>;

    /// Stamp a session as completed. Fails with `NotFound` when absent.
    async fn complete_session(&self, id: SessionId) -> AppResult<UploadSession>;
}
