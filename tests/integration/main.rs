//! Integration tests for the upload queue and history.

mod helpers;
mod queue_test;
