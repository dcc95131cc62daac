//! # drophub-store
//!
//! Record store clients for DropHub: the [`RecordStore`] trait plus the
//! in-memory and HTTP-backed implementations. The HTTP backend talks to
//! a generic hosted record-store API; the [`record`] module is the one
//! place where canonical field names are mapped to that store's
//! suffixed aliases.

pub mod http;
pub mod memory;
pub mod record;
pub mod store;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use store::RecordStore;
