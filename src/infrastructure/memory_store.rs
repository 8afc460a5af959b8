//! 内存文档存储
//!
//! 用于演练（DRY_RUN）和测试，进程结束即丢失

use crate::error::StoreError;
use crate::infrastructure::store::DocumentStore;
use crate::models::upload::UploadState;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.documents.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.lock().await.is_empty()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.documents.lock().await.keys().cloned().collect()
    }
}

impl DocumentStore for MemoryStore {
    async fn upsert(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        self.documents
            .lock()
            .await
            .insert(key.to_string(), document.clone());
        Ok(())
    }

    async fn persisted(&self) -> Result<UploadState, StoreError> {
        let documents = self.documents.lock().await;
        let mut state = UploadState::new();
        for (key, document) in documents.iter() {
            state.insert(key.clone(), Some(document.clone()));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryStore::new();
        store.upsert("q-1", &json!({ "stem": "a" })).await.unwrap();
        store.upsert("q-1", &json!({ "stem": "a" })).await.unwrap();
        assert_eq!(store.len().await, 1);

        store.upsert("q-1", &json!({ "stem": "b" })).await.unwrap();
        assert_eq!(store.get("q-1").await, Some(json!({ "stem": "b" })));

        let state = store.persisted().await.unwrap();
        assert!(state.contains("q-1"));
        assert_eq!(state.document("q-1"), Some(&json!({ "stem": "b" })));
    }
}
