//! 文档存储 - 基础设施层
//!
//! 外部文档存储只暴露两种能力：
//! - 按键幂等 upsert（键为 questionId）
//! - 列出已持久化的键（及可读到的内容）
//!
//! 重试策略属于存储实现，调用方不重试。

use crate::error::StoreError;
use crate::models::upload::UploadState;
use serde_json::Value;

/// 文档存储
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// 写入或覆盖一个文档，重复写入相同内容结果不变
    async fn upsert(&self, key: &str, document: &Value) -> Result<(), StoreError>;

    /// 已持久化的文档
    async fn persisted(&self) -> Result<UploadState, StoreError>;
}
