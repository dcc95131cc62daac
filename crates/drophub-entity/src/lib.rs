//! # drophub-entity
//!
//! Domain entity models for DropHub. Every struct in this crate
//! represents a record in the upload store or a queue-local value
//! object. All entities derive `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod session;
pub mod upload;
