//! 上传流程 - 流程层
//!
//! 核心职责：执行上传计划中的写入操作
//!
//! - 按批次执行，每批内部限制并发数
//! - 单个写入失败只记录到报告中，不影响其他写入
//! - 不做重试：重新规划即可续传

use crate::config::Config;
use crate::error::StoreError;
use crate::infrastructure::DocumentStore;
use crate::models::upload::WriteOperation;
use crate::utils::logging::{log_batch_complete, log_batch_start};
use futures::stream::{self, StreamExt};
use tracing::{debug, error};

/// 上传结果
#[derive(Debug, Default)]
pub struct UploadReport {
    /// 写入成功的 questionId（按完成顺序）
    pub written: Vec<String>,
    /// 写入失败的 questionId 及原因
    pub failed: Vec<(String, StoreError)>,
}

impl UploadReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 上传流程
///
/// - 不持有存储，由调用方传入
/// - 只认识 `WriteOperation`，不关心题库结构
pub struct UploadFlow {
    batch_size: usize,
    concurrency: usize,
}

impl UploadFlow {
    /// 按配置创建
    pub fn new(config: &Config) -> Self {
        Self::with_limits(config.upload_batch_size, config.upload_concurrency)
    }

    pub fn with_limits(batch_size: usize, concurrency: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            concurrency: concurrency.max(1),
        }
    }

    /// 执行全部写入操作
    pub async fn run<S: DocumentStore>(
        &self,
        store: &S,
        operations: &[WriteOperation],
    ) -> UploadReport {
        let total = operations.len();
        let total_batches = (total + self.batch_size - 1) / self.batch_size;
        let mut report = UploadReport::default();

        for (batch_idx, batch) in operations.chunks(self.batch_size).enumerate() {
            let batch_start = batch_idx * self.batch_size;
            log_batch_start(
                batch_idx + 1,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            let results: Vec<(String, Result<(), StoreError>)> = stream::iter(batch)
                .map(|op| async move { (op.question_id.clone(), self.execute(store, op).await) })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            let mut success = 0;
            for (question_id, result) in results {
                match result {
                    Ok(()) => {
                        debug!("[{}] ✓ 写入成功", question_id);
                        success += 1;
                        report.written.push(question_id);
                    }
                    Err(e) => {
                        error!("[{}] ❌ 写入失败: {}", question_id, e);
                        report.failed.push((question_id, e));
                    }
                }
            }

            log_batch_complete(batch_idx + 1, success, batch.len());
        }

        report
    }

    /// 执行单个 upsert
    async fn execute<S: DocumentStore>(
        &self,
        store: &S,
        operation: &WriteOperation,
    ) -> Result<(), StoreError> {
        let document =
            serde_json::to_value(&operation.question).map_err(|source| StoreError::Serialize {
                key: operation.question_id.clone(),
                source,
            })?;
        store.upsert(&operation.question_id, &document).await
    }
}
