//! Record store configuration.

use serde::{Deserialize, Serialize};

/// Which record store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store, no persistence across runs.
    Memory,
    /// Hosted record-store HTTP API.
    Http,
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::Memory
    }
}

/// Top-level record store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StoreBackend,
    /// HTTP backend settings (ignored for the memory backend).
    #[serde(default)]
    pub http: HttpStoreConfig,
}

/// Hosted record-store API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpStoreConfig {
    /// Base URL of the record-store API.
    #[serde(default)]
    pub base_url: String,
    /// Project identifier sent with every request.
    #[serde(default)]
    pub project_id: String,
    /// API key used as a bearer token (empty disables the header).
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            project_id: String::new(),
            api_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
