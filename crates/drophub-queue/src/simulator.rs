//! Simulated transfer engine.
//!
//! There is no real byte transfer; an upload is a paced walk of the
//! progress range persisted to the record store, matching what a
//! storage backend integration would report. The walk is cooperative:
//! cancellation is observed between steps, never mid-write.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use drophub_core::config::SimulatorConfig;
use drophub_core::result::AppResult;
use drophub_core::types::EntryId;
use drophub_entity::upload::{UploadEntry, UploadPatch};
use drophub_store::RecordStore;

/// How a simulated transfer ended, short of an error.
#[derive(Debug, Clone)]
pub enum SimulationOutcome {
    /// The transfer ran to 100% and the entry was marked completed.
    Completed(UploadEntry),
    /// The transfer was cancelled (or its entry removed) mid-flight
    /// and the entry reverted to `pending`.
    Cancelled,
}

/// Drives a single entry from 0 to 100 percent against the store.
pub struct UploadSimulator<S: ?Sized> {
    store: std::sync::Arc<S>,
    config: SimulatorConfig,
}

impl<S: RecordStore + ?Sized> UploadSimulator<S> {
    pub fn new(store: std::sync::Arc<S>, config: SimulatorConfig) -> Self {
        Self { store, config }
    }

    /// Run the transfer for one entry.
    ///
    /// Each step pauses for the configured interval, persists the new
    /// progress, and reports it through `on_progress`. Progress is
    /// monotone and the final step is always exactly 100; that step
    /// writes `completed` together with the upload timestamp and URL,
    /// so a subscriber seeing 100% never reads a still-`uploading`
    /// record.
    ///
    /// Cancellation between steps reverts the entry to `pending` at
    /// zero progress. A `NotFound` from the store mid-flight means the
    /// entry was removed underneath us and counts as cancellation.
    #[instrument(skip(self, token, on_progress), fields(id = %id))]
    pub async fn run(
        &self,
        id: EntryId,
        token: &CancellationToken,
        mut on_progress: impl FnMut(u8) + Send,
    ) -> AppResult<SimulationOutcome> {
        let step = self.config.step_percent.clamp(1, 100);

        let mut percent: u8 = 0;
        loop {
            if token.is_cancelled() {
                return self.revert(id).await;
            }

            tokio::time::sleep(self.config.step_interval()).await;

            if token.is_cancelled() {
                return self.revert(id).await;
            }

            let patch = if percent == 100 {
                UploadPatch::completed(Utc::now(), format!("/uploads/file-{id}"))
            } else {
                UploadPatch::uploading(percent)
            };
            match self.store.update(id, patch).await {
                Ok(entry) if percent == 100 => {
                    on_progress(percent);
                    debug!("transfer completed");
                    return Ok(SimulationOutcome::Completed(entry));
                }
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    debug!("entry removed mid-flight");
                    return Ok(SimulationOutcome::Cancelled);
                }
                Err(e) => return Err(e),
            }
            on_progress(percent);
            percent = percent.saturating_add(step).min(100);
        }
    }

    /// Best-effort revert of a cancelled entry back to `pending`.
    async fn revert(&self, id: EntryId) -> AppResult<SimulationOutcome> {
        match self.store.update(id, UploadPatch::reverted()).await {
            Ok(_) => {
                debug!("transfer cancelled, entry reverted");
                Ok(SimulationOutcome::Cancelled)
            }
            Err(e) if e.is_not_found() => Ok(SimulationOutcome::Cancelled),
            Err(e) => Err(e),
        }
    }
}
