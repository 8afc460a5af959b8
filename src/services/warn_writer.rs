//! 警告写入服务 - 业务能力层
//!
//! 只负责"追加写 warn.txt"能力，记录需要人工处理的问题：
//! - 被拒收的题组
//! - 存储内容与题库不一致的题目
//! - 质量检查发现的问题

use crate::error::NormalizeFailure;
use crate::models::upload::UploadDivergence;
use crate::services::quality_checker::QualityIssue;
use anyhow::Result;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 警告写入服务
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 记录被拒收的题组
    pub async fn write_rejected_set(&self, failure: &NormalizeFailure) -> Result<()> {
        let line = format!(
            "[{}] 题组拒收 | {} | {}\n",
            timestamp(),
            failure.set_name(),
            failure
        );
        self.append(&line).await
    }

    /// 记录无法读取的题组文件
    pub async fn write_unloadable_set(&self, set_name: &str, reason: &str) -> Result<()> {
        let line = format!("[{}] 题组无法读取 | {} | {}\n", timestamp(), set_name, reason);
        self.append(&line).await
    }

    /// 记录内容不一致的题目
    pub async fn write_divergence(&self, divergence: &UploadDivergence) -> Result<()> {
        let line = format!(
            "[{}] 内容不一致 | {} | {}\n",
            timestamp(),
            divergence.question_id,
            divergence
        );
        self.append(&line).await
    }

    /// 记录质量检查问题
    pub async fn write_quality_issue(&self, issue: &QualityIssue) -> Result<()> {
        let line = format!("[{}] 质量检查 | {}\n", timestamp(), issue);
        self.append(&line).await
    }

    async fn append(&self, line: &str) -> Result<()> {
        debug!("写入警告: {} | {}", self.warn_file_path, line.trim_end());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
