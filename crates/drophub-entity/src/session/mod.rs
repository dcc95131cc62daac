//! Upload session entities.

pub mod model;

pub use model::{NewSession, UploadSession};
