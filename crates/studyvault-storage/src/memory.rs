//! In-memory storage for tests.

use crate::keys::generate_storage_key;
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Stores files in a map. Uploads can be made to fail on demand.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Bytes>>>,
    fail_uploads: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following upload fail with `UploadFailed`.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn has_file(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    fn url(key: &str) -> String {
        format!("https://files.example.com/{}", key)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload(
        &self,
        prefix: &str,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<(String, String)> {
        let key = generate_storage_key(prefix, filename);
        let url = self.upload_with_key(&key, data, content_type).await?;
        Ok((key, url))
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "simulated upload failure".to_string(),
            ));
        }
        self.files
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        Ok(Self::url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        self.files
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let data = self.download(storage_key).await?;
        Ok(Box::pin(stream::once(async move { Ok(data) })))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.files.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
