//! Core type definitions used across the DropHub workspace.

pub mod id;

pub use id::{EntryId, SessionId};
