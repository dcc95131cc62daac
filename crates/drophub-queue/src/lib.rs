//! # drophub-queue
//!
//! The upload queue controller and its collaborators: policy
//! validation, the simulated transfer engine, queue lifecycle
//! management, progress events and the completed-upload history view.

pub mod events;
pub mod history;
pub mod queue;
pub mod simulator;
pub mod summary;
pub mod validator;

pub use events::QueueEvent;
pub use history::HistoryView;
pub use queue::{BatchReport, EnqueueReport, UploadQueue};
pub use simulator::{SimulationOutcome, UploadSimulator};
pub use summary::QueueSummary;
pub use validator::{UploadValidator, ValidationError};
