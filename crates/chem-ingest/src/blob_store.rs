//! `BlobStore`, standing in for the excluded object-store service (spec §1
//! Non-goals, §4.4 Phase 1). Phase 1 mints a storage key for the raw upload;
//! what actually backs that key is out of scope here.

use async_trait::async_trait;

use crate::error::IngestError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), IngestError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, IngestError>;
}

/// In-memory test double (spec §4.4 Phase 1: "persist to blob storage and
/// mint a storage key").
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: tokio::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), IngestError> {
        self.objects.lock().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, IngestError> {
        self.objects
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| IngestError::BlobStore(format!("no object for key '{key}'")))
    }
}

pub fn mint_storage_key(filename: &str) -> String {
    format!("csv-uploads/{}/{}", uuid::Uuid::new_v4(), filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryBlobStore::new();
        let key = mint_storage_key("molecules.csv");
        store.put(&key, b"a,b\n1,2\n".to_vec()).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), b"a,b\n1,2\n".to_vec());
    }

    #[tokio::test]
    async fn missing_key_errors() {
        let store = InMemoryBlobStore::new();
        assert!(store.get("missing").await.is_err());
    }
}
