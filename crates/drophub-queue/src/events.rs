//! Queue lifecycle events.

use serde::{Deserialize, Serialize};

use drophub_core::types::{EntryId, SessionId};
use drophub_entity::upload::UploadStatus;

/// An observable change in the upload queue.
///
/// Events are broadcast to subscribers as they happen; the CLI renders
/// them live and tests assert on the exact sequence. A slow subscriber
/// may miss events (the channel is bounded), never see them reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A candidate passed validation and entered the queue.
    Queued { id: EntryId, name: String },
    /// A candidate failed validation and was not queued.
    Rejected { name: String, reason: String },
    /// An entry moved between lifecycle states.
    StateChanged {
        id: EntryId,
        from: UploadStatus,
        to: UploadStatus,
    },
    /// An in-flight entry reported progress.
    Progress { id: EntryId, percent: u8 },
    /// A batch run began.
    BatchStarted {
        session: Option<SessionId>,
        entries: usize,
    },
    /// A batch run finished.
    BatchFinished { completed: usize, failed: usize },
}
