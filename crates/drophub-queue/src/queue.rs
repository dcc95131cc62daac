//! The upload queue controller.
//!
//! Owns the in-memory queue state and drives entries through their
//! lifecycle: `pending` → `uploading` → `completed`, with `error` on
//! store failure and a revert to `pending` on cancellation. All
//! persistence goes through the [`RecordStore`]; the queue itself holds
//! no durable state.
//!
//! Locking discipline: the state lock is never held across a store
//! call. Live progress for in-flight entries is mirrored in an atomic
//! per flight, so snapshots read it without touching the simulator.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use drophub_core::config::{PolicyConfig, SimulatorConfig};
use drophub_core::error::AppError;
use drophub_core::result::AppResult;
use drophub_core::types::{EntryId, SessionId};
use drophub_entity::session::NewSession;
use drophub_entity::upload::{CandidateFile, NewUpload, UploadEntry, UploadPatch, UploadStatus};
use drophub_store::RecordStore;

use crate::events::QueueEvent;
use crate::simulator::{SimulationOutcome, UploadSimulator};
use crate::summary::QueueSummary;
use crate::validator::UploadValidator;

const EVENT_CAPACITY: usize = 256;

/// Result of offering a batch of candidates to the queue.
#[derive(Debug, Default)]
pub struct EnqueueReport {
    /// Entries accepted and created in the store, in offer order.
    pub queued: Vec<UploadEntry>,
    /// Candidates turned away, as `(name, reason)` pairs in offer
    /// order: policy rejections and store create failures alike.
    pub rejected: Vec<(String, String)>,
}

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Entries that reached `completed`.
    pub completed: usize,
    /// Entries that failed, with the failure message.
    pub failed: Vec<(EntryId, String)>,
    /// Entries cancelled mid-flight and reverted to `pending`.
    pub cancelled: usize,
    /// The session grouping this batch, when one could be opened.
    pub session: Option<SessionId>,
}

/// A queued entry plus its queue-local file handle.
struct QueueSlot {
    entry: UploadEntry,
    /// Where the payload lives on disk. Never persisted; absent for
    /// entries cloned from history.
    source: Option<PathBuf>,
}

/// Book-keeping for an in-flight transfer.
struct ActiveUpload {
    token: CancellationToken,
    progress: Arc<AtomicU8>,
}

#[derive(Default)]
struct QueueState {
    /// Entry ids in arrival order.
    order: Vec<EntryId>,
    slots: HashMap<EntryId, QueueSlot>,
    active: HashMap<EntryId, ActiveUpload>,
}

/// The upload queue controller.
pub struct UploadQueue {
    store: Arc<dyn RecordStore>,
    validator: UploadValidator,
    simulator: UploadSimulator<dyn RecordStore>,
    state: RwLock<QueueState>,
    events: broadcast::Sender<QueueEvent>,
    /// Set while a batch run is in progress.
    running: AtomicBool,
}

enum RunResult {
    Completed,
    Failed(String),
    Cancelled,
    /// The slot disappeared before the transfer started.
    Skipped,
}

impl UploadQueue {
    pub fn new(
        store: Arc<dyn RecordStore>,
        policy: PolicyConfig,
        simulator: SimulatorConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            simulator: UploadSimulator::new(store.clone(), simulator),
            store,
            validator: UploadValidator::new(policy),
            state: RwLock::new(QueueState::default()),
            events,
            running: AtomicBool::new(false),
        }
    }

    /// Subscribe to queue events. Events published before the call are
    /// not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: QueueEvent) {
        // Send fails only when nobody is listening.
        let _ = self.events.send(event);
    }

    /// Offer candidate files to the queue.
    ///
    /// Each candidate is validated against the policy; accepted files
    /// are created in the store as `pending` and take their place at
    /// the back of the queue. One bad file never blocks the others: a
    /// policy rejection or a store refusal becomes a notice in the
    /// report and the remaining candidates are still processed.
    pub async fn enqueue(&self, candidates: Vec<CandidateFile>) -> AppResult<EnqueueReport> {
        let mut report = EnqueueReport::default();

        for candidate in candidates {
            if let Err(reason) = self.validator.validate(&candidate) {
                warn!(name = %candidate.name, %reason, "candidate rejected");
                self.emit(QueueEvent::Rejected {
                    name: candidate.name.clone(),
                    reason: reason.to_string(),
                });
                report.rejected.push((candidate.name, reason.to_string()));
                continue;
            }

            let name = candidate.name.clone();
            let entry = match self
                .store
                .create(NewUpload {
                    name: candidate.name,
                    size_bytes: candidate.size_bytes,
                    media_type: candidate.media_type,
                })
                .await
            {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(name = %name, error = %e, "failed to create upload record");
                    self.emit(QueueEvent::Rejected {
                        name: name.clone(),
                        reason: e.to_string(),
                    });
                    report.rejected.push((name, e.to_string()));
                    continue;
                }
            };

            let mut state = self.state.write().await;
            state.order.push(entry.id);
            state.slots.insert(
                entry.id,
                QueueSlot {
                    entry: entry.clone(),
                    source: candidate.source,
                },
            );
            drop(state);

            info!(id = %entry.id, name = %entry.name, "queued");
            self.emit(QueueEvent::Queued {
                id: entry.id,
                name: entry.name.clone(),
            });
            report.queued.push(entry);
        }

        Ok(report)
    }

    /// Run every pending entry, sequentially, in arrival order.
    ///
    /// Only one batch may run at a time; a second call while a batch
    /// is in flight fails without touching the queue. Entries that fail
    /// are marked `error` and the batch moves on.
    pub async fn start_all(&self) -> AppResult<BatchReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::internal("An upload batch is already running"));
        }

        let result = self.run_batch().await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_batch(&self) -> AppResult<BatchReport> {
        let state = self.state.read().await;
        let pending: Vec<UploadEntry> = state
            .order
            .iter()
            .filter_map(|id| state.slots.get(id))
            .filter(|slot| slot.entry.status == UploadStatus::Pending)
            .map(|slot| slot.entry.clone())
            .collect();
        drop(state);

        let session = self.open_session(&pending).await;
        self.emit(QueueEvent::BatchStarted {
            session,
            entries: pending.len(),
        });
        info!(entries = pending.len(), "batch started");

        let mut report = BatchReport {
            completed: 0,
            failed: Vec::new(),
            cancelled: 0,
            session,
        };

        for entry in &pending {
            match self.run_one(entry.id).await? {
                RunResult::Completed => report.completed += 1,
                RunResult::Failed(reason) => report.failed.push((entry.id, reason)),
                RunResult::Cancelled => report.cancelled += 1,
                RunResult::Skipped => {}
            }
        }

        if let Some(id) = session {
            if let Err(e) = self.store.complete_session(id).await {
                warn!(session = %id, error = %e, "failed to close upload session");
            }
        }

        self.emit(QueueEvent::BatchFinished {
            completed: report.completed,
            failed: report.failed.len(),
        });
        info!(
            completed = report.completed,
            failed = report.failed.len(),
            cancelled = report.cancelled,
            "batch finished"
        );
        Ok(report)
    }

    /// Open a session grouping the batch. Best-effort: a store refusal
    /// downgrades to an untracked batch rather than blocking uploads.
    async fn open_session(&self, entries: &[UploadEntry]) -> Option<SessionId> {
        if entries.is_empty() {
            return None;
        }
        match self
            .store
            .create_session(NewSession::for_entries(entries))
            .await
        {
            Ok(session) => Some(session.id),
            Err(e) => {
                warn!(error = %e, "failed to open upload session");
                None
            }
        }
    }

    /// Drive a single entry through its transfer.
    async fn run_one(&self, id: EntryId) -> AppResult<RunResult> {
        let token = CancellationToken::new();
        let progress = Arc::new(AtomicU8::new(0));

        {
            let mut state = self.state.write().await;
            if !state.slots.contains_key(&id) {
                return Ok(RunResult::Skipped);
            }
            state.active.insert(
                id,
                ActiveUpload {
                    token: token.clone(),
                    progress: progress.clone(),
                },
            );
        }
        self.set_slot_status(id, UploadStatus::Pending, UploadStatus::Uploading)
            .await;

        let outcome = self
            .simulator
            .run(id, &token, |percent| {
                progress.store(percent, Ordering::Relaxed);
                self.emit(QueueEvent::Progress { id, percent });
            })
            .await;

        let result = match outcome {
            Ok(SimulationOutcome::Completed(entry)) => {
                let mut state = self.state.write().await;
                if let Some(slot) = state.slots.get_mut(&id) {
                    slot.entry = entry;
                }
                drop(state);
                self.set_slot_status(id, UploadStatus::Uploading, UploadStatus::Completed)
                    .await;
                RunResult::Completed
            }
            Ok(SimulationOutcome::Cancelled) => {
                let mut state = self.state.write().await;
                if let Some(slot) = state.slots.get_mut(&id) {
                    slot.entry.apply(&UploadPatch::reverted());
                }
                drop(state);
                self.set_slot_status(id, UploadStatus::Uploading, UploadStatus::Pending)
                    .await;
                info!(id = %id, "upload cancelled");
                RunResult::Cancelled
            }
            Err(e) => {
                warn!(id = %id, error = %e, "upload failed");
                // Persisting the error state is best-effort; the store
                // just refused an update for this entry.
                if let Err(patch_err) = self.store.update(id, UploadPatch::failed()).await {
                    warn!(id = %id, error = %patch_err, "failed to persist error state");
                }
                let mut state = self.state.write().await;
                if let Some(slot) = state.slots.get_mut(&id) {
                    slot.entry.apply(&UploadPatch::failed());
                }
                drop(state);
                self.set_slot_status(id, UploadStatus::Uploading, UploadStatus::Error)
                    .await;
                RunResult::Failed(e.to_string())
            }
        };

        self.state.write().await.active.remove(&id);
        Ok(result)
    }

    /// Update a slot's status (if it still exists) and emit the
    /// transition event.
    async fn set_slot_status(&self, id: EntryId, from: UploadStatus, to: UploadStatus) {
        let mut state = self.state.write().await;
        let Some(slot) = state.slots.get_mut(&id) else {
            return;
        };
        slot.entry.status = to;
        drop(state);
        self.emit(QueueEvent::StateChanged { id, from, to });
    }

    /// Request cancellation of an in-flight entry.
    ///
    /// Returns `true` when a transfer was actually signalled; `false`
    /// for entries that are not uploading, which is a no-op.
    pub async fn cancel(&self, id: EntryId) -> bool {
        let state = self.state.read().await;
        match state.active.get(&id) {
            Some(active) => {
                active.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Remove an entry from the queue and delete its record.
    ///
    /// An in-flight entry is cancelled first; the running transfer
    /// observes the deletion and stops.
    pub async fn remove(&self, id: EntryId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(active) = state.active.get(&id) {
            active.token.cancel();
        }
        state.order.retain(|other| *other != id);
        state.slots.remove(&id);
        drop(state);

        self.store.delete(id).await?;
        info!(id = %id, "removed from queue");
        Ok(())
    }

    /// Retry a failed entry.
    ///
    /// The failed record is discarded and a fresh `pending` entry is
    /// created from the same file, keeping its queue-local source
    /// handle. Fails unless the entry is in `error`.
    pub async fn retry(&self, id: EntryId) -> AppResult<UploadEntry> {
        let state = self.state.read().await;
        let slot = state
            .slots
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Upload {id} not found")))?;
        if !slot.entry.status.can_retry() {
            return Err(AppError::validation(format!(
                "Upload {id} is {} and cannot be retried",
                slot.entry.status
            )));
        }
        let new = NewUpload::cloned_from(&slot.entry);
        let source = slot.source.clone();
        drop(state);

        // Discard the failed attempt; retries leave no audit trail.
        if let Err(e) = self.store.delete(id).await {
            if !e.is_not_found() {
                return Err(e);
            }
        }
        let mut state = self.state.write().await;
        state.order.retain(|other| *other != id);
        state.slots.remove(&id);
        drop(state);

        self.insert_fresh(new, source).await
    }

    /// Queue a fresh `pending` entry for a file already known to the
    /// store, without a local payload handle. Used by history
    /// re-upload.
    pub async fn requeue_from(&self, entry: &UploadEntry) -> AppResult<UploadEntry> {
        self.insert_fresh(NewUpload::cloned_from(entry), None).await
    }

    async fn insert_fresh(&self, new: NewUpload, source: Option<PathBuf>) -> AppResult<UploadEntry> {
        let entry = self.store.create(new).await?;

        let mut state = self.state.write().await;
        state.order.push(entry.id);
        state.slots.insert(
            entry.id,
            QueueSlot {
                entry: entry.clone(),
                source,
            },
        );
        drop(state);

        self.emit(QueueEvent::Queued {
            id: entry.id,
            name: entry.name.clone(),
        });
        Ok(entry)
    }

    /// Empty the queue.
    ///
    /// In-flight transfers are cancelled; store records are left alone,
    /// so completed history survives. Returns the number of entries
    /// dropped.
    pub async fn clear_all(&self) -> usize {
        let mut state = self.state.write().await;
        for active in state.active.values() {
            active.token.cancel();
        }
        let dropped = state.slots.len();
        state.order.clear();
        state.slots.clear();
        info!(dropped, "queue cleared");
        dropped
    }

    /// Current queue contents in arrival order, with live progress
    /// overlaid on in-flight entries.
    pub async fn snapshot(&self) -> Vec<UploadEntry> {
        let state = self.state.read().await;
        state
            .order
            .iter()
            .filter_map(|id| state.slots.get(id))
            .map(|slot| {
                let mut entry = slot.entry.clone();
                if let Some(active) = state.active.get(&entry.id) {
                    entry.progress = active.progress.load(Ordering::Relaxed);
                }
                entry
            })
            .collect()
    }

    /// Aggregate statistics over the current queue contents.
    pub async fn summary(&self) -> QueueSummary {
        QueueSummary::from_entries(&self.snapshot().await)
    }

    /// The queue-local payload handle for an entry, when it has one.
    pub async fn source_handle(&self, id: EntryId) -> Option<PathBuf> {
        let state = self.state.read().await;
        state.slots.get(&id).and_then(|slot| slot.source.clone())
    }
}
