//! Wire-format records for the hosted record store.
//!
//! The hosted API stores every domain field under a suffixed alias
//! (`name_c`, `size_c`, …) and uses `Id`/`CreatedOn` system fields.
//! This module is the only place those alias names appear; conversions
//! to and from the canonical entity types happen here, at the client
//! boundary, so business logic never branches on storage names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drophub_core::types::{EntryId, SessionId};
use drophub_entity::session::{NewSession, UploadSession};
use drophub_entity::upload::{NewUpload, UploadEntry, UploadPatch, UploadStatus};

/// Storage alias of the status field, used in list query parameters.
pub const STATUS_FIELD: &str = "status_c";

/// An `upload` record as stored by the hosted API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "name_c")]
    pub name: String,
    #[serde(rename = "size_c")]
    pub size_bytes: u64,
    #[serde(rename = "type_c", default)]
    pub media_type: String,
    #[serde(rename = "status_c")]
    pub status: UploadStatus,
    #[serde(rename = "progress_c")]
    pub progress: u8,
    #[serde(rename = "uploaded_at_c", default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(rename = "url_c", default)]
    pub url: Option<String>,
    #[serde(rename = "CreatedOn")]
    pub created_at: DateTime<Utc>,
}

impl From<UploadRecord> for UploadEntry {
    fn from(record: UploadRecord) -> Self {
        Self {
            id: EntryId::from_raw(record.id),
            name: record.name,
            size_bytes: record.size_bytes,
            media_type: record.media_type,
            status: record.status,
            progress: record.progress,
            uploaded_at: record.uploaded_at,
            url: record.url,
            created_at: record.created_at,
        }
    }
}

/// Creation payload for an `upload` record.
#[derive(Debug, Serialize)]
pub struct NewUploadRecord {
    #[serde(rename = "name_c")]
    pub name: String,
    #[serde(rename = "size_c")]
    pub size_bytes: u64,
    #[serde(rename = "type_c")]
    pub media_type: String,
    #[serde(rename = "status_c")]
    pub status: UploadStatus,
    #[serde(rename = "progress_c")]
    pub progress: u8,
}

impl From<&NewUpload> for NewUploadRecord {
    fn from(new: &NewUpload) -> Self {
        Self {
            name: new.name.clone(),
            size_bytes: new.size_bytes,
            media_type: new.media_type.clone(),
            status: UploadStatus::Pending,
            progress: 0,
        }
    }
}

/// Partial update payload for an `upload` record.
///
/// `None` fields are omitted from the request body entirely, so the
/// store leaves them untouched.
#[derive(Debug, Serialize)]
pub struct UploadRecordPatch {
    #[serde(rename = "status_c", skip_serializing_if = "Option::is_none")]
    pub status: Option<UploadStatus>,
    #[serde(rename = "progress_c", skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(rename = "uploaded_at_c", skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(rename = "url_c", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&UploadPatch> for UploadRecordPatch {
    fn from(patch: &UploadPatch) -> Self {
        Self {
            status: patch.status,
            progress: patch.progress,
            uploaded_at: patch.uploaded_at,
            url: patch.url.clone(),
        }
    }
}

/// An `upload_session` record. The store has no array type, so the
/// entry id list is a comma-joined string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "files_c")]
    pub entry_ids: String,
    #[serde(rename = "total_size_c")]
    pub total_size_bytes: u64,
    #[serde(rename = "started_at_c")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "completed_at_c", default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<SessionRecord> for UploadSession {
    fn from(record: SessionRecord) -> Self {
        Self {
            id: SessionId::from_raw(record.id),
            entry_ids: parse_id_list(&record.entry_ids),
            total_size_bytes: record.total_size_bytes,
            started_at: record.started_at,
            completed_at: record.completed_at,
        }
    }
}

/// Creation payload for an `upload_session` record.
#[derive(Debug, Serialize)]
pub struct NewSessionRecord {
    #[serde(rename = "files_c")]
    pub entry_ids: String,
    #[serde(rename = "total_size_c")]
    pub total_size_bytes: u64,
    #[serde(rename = "started_at_c")]
    pub started_at: DateTime<Utc>,
}

impl From<&NewSession> for NewSessionRecord {
    fn from(new: &NewSession) -> Self {
        Self {
            entry_ids: join_id_list(&new.entry_ids),
            total_size_bytes: new.total_size_bytes,
            started_at: Utc::now(),
        }
    }
}

fn join_id_list(ids: &[EntryId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a comma-joined id list, skipping malformed segments.
fn parse_id_list(raw: &str) -> Vec<EntryId> {
    raw.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}
