//! Upload domain entities.

pub mod model;
pub mod status;

pub use model::{CandidateFile, NewUpload, UploadEntry, UploadPatch};
pub use status::UploadStatus;
