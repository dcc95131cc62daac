//! Upload validation policy configuration.

use serde::{Deserialize, Serialize};

/// Size and media-type limits applied to candidate files before they
/// enter the upload queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Maximum upload size in bytes (default 10 MiB).
    #[serde(default = "default_max_size")]
    pub max_size_bytes: u64,
    /// Media types accepted into the queue. A candidate with an empty
    /// (unknown) type is rejected unless the empty string is listed.
    #[serde(default = "default_allowed_media_types")]
    pub allowed_media_types: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size(),
            allowed_media_types: default_allowed_media_types(),
        }
    }
}

fn default_max_size() -> u64 {
    10_485_760 // 10 MiB
}

fn default_allowed_media_types() -> Vec<String> {
    [
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "text/plain",
        "text/csv",
        "application/json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
