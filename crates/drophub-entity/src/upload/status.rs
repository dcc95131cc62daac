//! Upload status enumeration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an upload entry.
///
/// Exactly one status holds at any time. `uploading → pending` happens
/// only through cancellation; an errored entry re-enters the queue only
/// as a fresh clone created by retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Validated and waiting for the batch to start.
    Pending,
    /// Currently being transferred.
    Uploading,
    /// Transfer finished; the entry is immutable except for deletion.
    Completed,
    /// Transfer failed; eligible for retry.
    Error,
}

impl UploadStatus {
    /// Check if the entry is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Check if the entry can be retried.
    pub fn can_retry(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
