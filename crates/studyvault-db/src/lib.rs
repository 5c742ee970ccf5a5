//! Data access layer for submissions.
//!
//! `SubmissionStore` is the seam the services depend on. Production uses the
//! Postgres-backed `SubmissionRepository`; the `test-helpers` feature adds an
//! in-memory store with the same transition guarantees.

pub mod db;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
pub mod traits;

pub use db::SubmissionRepository;
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::InMemorySubmissionStore;
pub use traits::SubmissionStore;
