//! 回滚文件写入服务 - 业务能力层
//!
//! 每次上传结束后把本次写入的 questionId 列表保存到
//! `<dir>/<slug>-<YYYY-MM-DD>-ids.json`，便于事后撤回。

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 回滚文件写入服务
pub struct RollbackWriter {
    dir: PathBuf,
}

impl RollbackWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 回滚文件路径
    pub fn file_path(&self, slug: &str, date: chrono::NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}-{}-ids.json", slug, date.format("%Y-%m-%d")))
    }

    /// 写入本次上传的 ID 列表
    ///
    /// 同一天多次上传时合并已有列表（去重，保持首次出现顺序）
    pub async fn write(&self, slug: &str, written_ids: &[String]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("无法创建目录: {}", self.dir.display()))?;

        let path = self.file_path(slug, chrono::Local::now().date_naive());
        let mut ids = read_existing(&path).await?;
        for id in written_ids {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }

        let content = serde_json::to_string_pretty(&ids)?;
        fs::write(&path, content)
            .await
            .with_context(|| format!("无法写入回滚文件: {}", path.display()))?;

        Ok(path)
    }
}

async fn read_existing(path: &Path) -> Result<Vec<String>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取回滚文件: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("无法解析回滚文件: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_merges_same_day() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RollbackWriter::new(dir.path());

        let first = writer
            .write("energy", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        let second = writer
            .write("energy", &["b".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(first, second);

        let ids: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&second).unwrap()).unwrap();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
