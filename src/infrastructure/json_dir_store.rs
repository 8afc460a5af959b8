//! 目录文档存储
//!
//! 每个文档一个文件：`<root>/<questionId>.json`。
//! 写入先落到临时文件再改名，中断时不会留下半个文档。

use crate::error::StoreError;
use crate::infrastructure::store::DocumentStore;
use crate::models::upload::UploadState;
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs;
use tracing::warn;

const EXTENSION: &str = "json";

pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.starts_with('.')
            && !key.contains(&['/', '\\', '\0'][..]);
        if !valid {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{}.{}", key, EXTENSION)))
    }
}

impl DocumentStore for JsonDirStore {
    async fn upsert(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        let path = self.document_path(key)?;
        let content = serde_json::to_vec_pretty(document).map_err(|source| {
            StoreError::Serialize {
                key: key.to_string(),
                source,
            }
        })?;

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(key, e))?;

        let tmp_path = self.root.join(format!(".{}.{}.tmp", key, EXTENSION));
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| StoreError::io(key, e))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StoreError::io(key, e))?;

        Ok(())
    }

    async fn persisted(&self) -> Result<UploadState, StoreError> {
        let mut state = UploadState::new();
        let root_key = self.root.display().to_string();

        if !fs::try_exists(&self.root).await.unwrap_or(false) {
            return Ok(state);
        }

        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::io(root_key.as_str(), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(root_key.as_str(), e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if key.starts_with('.') {
                continue;
            }

            // 内容读不出来的文档单独记录，由上传计划作为不一致上报
            match fs::read(&path).await {
                Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                    Ok(value) => state.insert(key, Some(value)),
                    Err(e) => {
                        warn!("⚠️ 文档无法解析 {}: {}", path.display(), e);
                        state.insert_unreadable(key, e.to_string());
                    }
                },
                Err(e) => {
                    warn!("⚠️ 文档无法读取 {}: {}", path.display(), e);
                    state.insert_unreadable(key, e.to_string());
                }
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bank::BankMetadata;
    use crate::models::range::SequenceRange;
    use crate::models::upload::StoredDocument;
    use crate::services::bank_assembler::assemble;
    use crate::services::schema_validator::tests::mcq_record;
    use crate::services::set_normalizer::normalize;
    use crate::services::upload_planner;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::new(dir.path().join("questions"));

        // 目录不存在时视为空
        assert!(store.persisted().await.unwrap().is_empty());

        store.upsert("eft-001", &json!({ "stem": "a" })).await.unwrap();
        store.upsert("eft-002", &json!({ "stem": "b" })).await.unwrap();
        store.upsert("eft-001", &json!({ "stem": "c" })).await.unwrap();

        let state = store.persisted().await.unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.document("eft-001"), Some(&json!({ "stem": "c" })));
    }

    #[tokio::test]
    async fn test_unreadable_document_is_reported_as_divergence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eft-001.json"), b"{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let store = JsonDirStore::new(dir.path());
        let state = store.persisted().await.unwrap();
        assert_eq!(state.len(), 1);
        assert!(matches!(
            state.get("eft-001"),
            Some(StoredDocument::Unreadable(_))
        ));
        assert_eq!(state.document("eft-001"), None);

        let record = mcq_record("eft-001", 1);
        let set = normalize("set1", &[record], SequenceRange::new(1, 1).unwrap()).unwrap();
        let bank = assemble(vec![set], BankMetadata::new("Energy", "Australian Curriculum v9", 1))
            .unwrap()
            .into_complete()
            .unwrap();

        let plan = upload_planner::plan(&bank, &state);
        assert!(plan.operations.is_empty());
        assert_eq!(plan.already_persisted, 0);
        assert_eq!(plan.divergences.len(), 1);
        assert_eq!(plan.divergences[0].question_id, "eft-001");
        assert_eq!(plan.divergences[0].stored, None);
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::new(dir.path());
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                store.upsert(key, &json!({})).await,
                Err(StoreError::InvalidKey { .. })
            ));
        }
    }
}
