//! StudyVault Storage Library
//!
//! Durable object storage for published submissions: the `Storage` trait plus
//! S3 (object_store) and local filesystem implementations.
//!
//! # Storage key format
//!
//! `{category}/{unix_millis}-{short_id}.{ext}`, e.g.
//! `question-paper/1718000000000-3f2a9c1e.pdf`. Keys must not contain `..` or a
//! leading `/`. Key generation lives in the `keys` module so every backend agrees.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "test-helpers")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "test-helpers")]
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use studyvault_core::StorageBackend;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
