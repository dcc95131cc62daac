//! Aggregate queue statistics.

use serde::{Deserialize, Serialize};

use drophub_entity::upload::{UploadEntry, UploadStatus};

/// A point-in-time aggregate over the queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueSummary {
    /// Entries currently in the queue.
    pub total: usize,
    pub pending: usize,
    pub uploading: usize,
    pub completed: usize,
    pub failed: usize,
    /// Sum of all entry sizes in bytes.
    pub total_bytes: u64,
    /// Sum of completed entry sizes in bytes.
    pub completed_bytes: u64,
    /// Mean per-entry contribution: completed entries count 100, an
    /// in-flight entry its current progress, everything else 0. Zero
    /// for an empty queue.
    pub overall_percent: f64,
}

impl QueueSummary {
    pub fn from_entries(entries: &[UploadEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };

        let mut contribution = 0u64;
        for entry in entries {
            summary.total_bytes += entry.size_bytes;
            match entry.status {
                UploadStatus::Pending => summary.pending += 1,
                UploadStatus::Uploading => {
                    summary.uploading += 1;
                    contribution += u64::from(entry.progress);
                }
                UploadStatus::Completed => {
                    summary.completed += 1;
                    summary.completed_bytes += entry.size_bytes;
                    contribution += 100;
                }
                UploadStatus::Error => summary.failed += 1,
            }
        }

        if !entries.is_empty() {
            summary.overall_percent = contribution as f64 / entries.len() as f64;
        }
        summary
    }
}
