//! HTTP client for a hosted record-store API.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use drophub_core::config::HttpStoreConfig;
use drophub_core::error::{AppError, ErrorKind};
use drophub_core::result::AppResult;
use drophub_core::types::{EntryId, SessionId};
use drophub_entity::session::{NewSession, UploadSession};
use drophub_entity::upload::{NewUpload, UploadEntry, UploadPatch, UploadStatus};

use crate::record::{
    NewSessionRecord, NewUploadRecord, STATUS_FIELD, SessionRecord, UploadRecord,
    UploadRecordPatch,
};
use crate::store::RecordStore;

const UPLOAD_COLLECTION: &str = "upload";
const SESSION_COLLECTION: &str = "upload_session";

/// A [`RecordStore`] backed by a hosted record-store HTTP API.
///
/// Records live under `{base_url}/records/{collection}`, with the
/// project id and an optional bearer token sent on every request.
#[derive(Debug)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    /// Build a client from configuration. Fails when the configured
    /// credentials cannot form valid header values.
    pub fn new(config: &HttpStoreConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Project-Id",
            HeaderValue::from_str(&config.project_id).map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid project id", e)
            })?,
        );
        if !config.api_key.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|e| {
                    AppError::with_source(ErrorKind::Configuration, "Invalid API key", e)
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Store, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/records/{collection}", self.base_url)
    }

    fn record_url(&self, collection: &str, id: i64) -> String {
        format!("{}/records/{collection}/{id}", self.base_url)
    }

    /// Map a response to success or a store error, turning 404 into
    /// `NotFound` with a caller-supplied message.
    async fn check(response: Response, missing: impl FnOnce() -> String) -> AppResult<Response> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(missing()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::new(
                ErrorKind::Store,
                format!("Record store returned {status}: {body}"),
            ));
        }
        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> AppResult<T> {
        response.json::<T>().await.map_err(|e| {
            AppError::with_source(ErrorKind::Store, "Failed to decode record store response", e)
        })
    }

    fn transport(e: reqwest::Error) -> AppError {
        AppError::with_source(ErrorKind::Store, "Record store request failed", e)
    }
}

#[async_trait]
impl RecordStore for HttpStore {
    async fn list(&self, filter: Option<UploadStatus>) -> AppResult<Vec<UploadEntry>> {
        let mut request = self.client.get(self.collection_url(UPLOAD_COLLECTION));
        if let Some(status) = filter {
            request = request.query(&[(STATUS_FIELD, status.as_str())]);
        }
        let response = request.send().await.map_err(Self::transport)?;
        let response = Self::check(response, || "Upload collection not found".to_string()).await?;
        let records: Vec<UploadRecord> = Self::decode(response).await?;
        debug!(count = records.len(), "listed upload records");

        let mut entries: Vec<UploadEntry> = records.into_iter().map(Into::into).collect();
        // The hosted API does not guarantee ordering, so sort here the
        // same way the in-memory store does.
        if filter == Some(UploadStatus::Completed) {
            entries.sort_by(|a, b| (b.uploaded_at, b.id).cmp(&(a.uploaded_at, a.id)));
        } else {
            entries.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        }
        Ok(entries)
    }

    async fn get(&self, id: EntryId) -> AppResult<UploadEntry> {
        let response = self
            .client
            .get(self.record_url(UPLOAD_COLLECTION, id.as_i64()))
            .send()
            .await
            .map_err(Self::transport)?;
        let response = Self::check(response, || format!("Upload {id} not found")).await?;
        let record: UploadRecord = Self::decode(response).await?;
        Ok(record.into())
    }

    async fn create(&self, new: NewUpload) -> AppResult<UploadEntry> {
        let response = self
            .client
            .post(self.collection_url(UPLOAD_COLLECTION))
            .json(&NewUploadRecord::from(&new))
            .send()
            .await
            .map_err(Self::transport)?;
        let response = Self::check(response, || "Upload collection not found".to_string()).await?;
        let record: UploadRecord = Self::decode(response).await?;
        debug!(id = record.id, name = %record.name, "created upload record");
        Ok(record.into())
    }

    async fn update(&self, id: EntryId, patch: UploadPatch) -> AppResult<UploadEntry> {
        let response = self
            .client
            .patch(self.record_url(UPLOAD_COLLECTION, id.as_i64()))
            .json(&UploadRecordPatch::from(&patch))
            .send()
            .await
            .map_err(Self::transport)?;
        let response = Self::check(response, || format!("Upload {id} not found")).await?;
        let record: UploadRecord = Self::decode(response).await?;
        Ok(record.into())
    }

    async fn delete(&self, id: EntryId) -> AppResult<()> {
        let response = self
            .client
            .delete(self.record_url(UPLOAD_COLLECTION, id.as_i64()))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::check(response, || format!("Upload {id} not found")).await?;
        Ok(())
    }

    async fn create_session(&self, new: NewSession) -> AppResult<UploadSession> {
        let response = self
            .client
            .post(self.collection_url(SESSION_COLLECTION))
            .json(&NewSessionRecord::from(&new))
            .send()
            .await
            .map_err(Self::transport)?;
        let response = Self::check(response, || "Session collection not found".to_string()).await?;
        let record: SessionRecord = Self::decode(response).await?;
        debug!(id = record.id, "created upload session");
        Ok(record.into())
    }

    async fn complete_session(&self, id: SessionId) -> AppResult<UploadSession> {
        let body = serde_json::json!({ "completed_at_c": Utc::now() });
        let response = self
            .client
            .patch(self.record_url(SESSION_COLLECTION, id.as_i64()))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport)?;
        let response = Self::check(response, || format!("Session {id} not found")).await?;
        let record: SessionRecord = Self::decode(response).await?;
        Ok(record.into())
    }
}
