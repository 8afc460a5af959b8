//! 题组处理器 - 编排层
//!
//! ## 职责
//!
//! 把清单中的原始题组逐个交给 `set_normalizer` 整理，并输出每个题组的处理日志。
//!
//! - 题组之间互不影响：一个题组被拒收不会中断其他题组
//! - 并发整理，结果保持输入顺序

use crate::error::NormalizeFailure;
use crate::models::set::{QuestionSet, RawSet};
use crate::services::set_normalizer;
use crate::workflow::SetCtx;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

/// 整理单个题组
pub fn process_set(raw: &RawSet, ctx: &SetCtx) -> Result<QuestionSet, NormalizeFailure> {
    log_set_start(ctx, raw.records.len());

    match set_normalizer::normalize_raw(raw) {
        Ok(set) => {
            info!("{} ✓ 整理完成: {} 道题", ctx, set.len());
            Ok(set)
        }
        Err(failure) => {
            error!("{} ❌ 题组被拒收: {}", ctx, failure);
            Err(failure)
        }
    }
}

/// 并发整理多个题组
///
/// 同时整理的题组数不超过 `max_concurrent`，返回结果与输入顺序一一对应
pub async fn normalize_sets(
    raw_sets: Vec<RawSet>,
    max_concurrent: usize,
) -> Result<Vec<Result<QuestionSet, NormalizeFailure>>> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut handles = Vec::with_capacity(raw_sets.len());

    for (idx, raw) in raw_sets.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let ctx = SetCtx::new(idx + 1, raw.name.clone(), raw.range);

        // 校验是纯计算，放到阻塞线程池中执行
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            process_set(&raw, &ctx)
        });
        handles.push(handle);
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await?);
    }

    Ok(results)
}

fn log_set_start(ctx: &SetCtx, record_count: usize) {
    info!("\n{}", "─".repeat(60));
    info!("{} 开始整理: {} 条原始记录", ctx, record_count);
}
