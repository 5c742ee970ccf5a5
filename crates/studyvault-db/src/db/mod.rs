//! Postgres repositories.

pub mod submission;

pub use submission::{SubmissionRepository, SubmissionRow};
