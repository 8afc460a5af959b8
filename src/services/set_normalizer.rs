//! 题组整理服务 - 业务能力层
//!
//! 把一批原始记录整理为 `QuestionSet`：
//! - 逐条校验，任意一条失败则整组拒收（不保留部分题组）
//! - 按 sequenceInPaper 排序
//! - 题号必须恰好覆盖声明的范围，不截断、不补齐、不重新编号

use crate::error::NormalizeFailure;
use crate::models::range::{self, SequenceRange};
use crate::models::set::{QuestionSet, RawSet};
use crate::services::schema_validator;
use serde_json::Value;
use tracing::debug;

/// 报错时最多列出的缺失区块数
const MAX_REPORTED_GAPS: usize = 10;

/// 整理一批原始记录
///
/// # 参数
/// - `set_name`: 题组名称（用于报错）
/// - `raw_records`: 原始记录
/// - `expected_range`: 声明的题号范围
pub fn normalize(
    set_name: &str,
    raw_records: &[Value],
    expected_range: SequenceRange,
) -> Result<QuestionSet, NormalizeFailure> {
    let mut questions = Vec::with_capacity(raw_records.len());

    for (index, record) in raw_records.iter().enumerate() {
        let question = schema_validator::validate(record).map_err(|failure| {
            NormalizeFailure::SchemaViolation {
                set_name: set_name.to_string(),
                index,
                question_id: record
                    .get("questionId")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                failure,
            }
        })?;
        questions.push(question);
    }

    questions.sort_by_key(|q| q.sequence());

    let found: Vec<u32> = questions.iter().map(|q| q.sequence()).collect();
    if let Some(reason) = sequence_problem(&found, expected_range) {
        return Err(NormalizeFailure::SequenceMismatch {
            set_name: set_name.to_string(),
            expected: expected_range,
            found,
            reason,
        });
    }

    debug!(
        "题组 {} 整理完成: {} 题 ({})",
        set_name,
        questions.len(),
        expected_range
    );

    Ok(QuestionSet::new(
        set_name.to_string(),
        expected_range,
        questions,
    ))
}

/// 整理 `RawSet`
pub fn normalize_raw(raw: &RawSet) -> Result<QuestionSet, NormalizeFailure> {
    normalize(&raw.name, &raw.records, raw.range)
}

/// 检查排序后的题号是否恰好等于范围内的每个位置，返回第一个问题
fn sequence_problem(sorted: &[u32], expected: SequenceRange) -> Option<String> {
    if let Some(outside) = sorted.iter().find(|n| !expected.contains(**n)) {
        return Some(format!("题号 {} 不在范围内", outside));
    }

    if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Some(format!("题号 {} 重复", pair[0]));
    }

    if sorted.len() != expected.len() {
        let missing = range::uncovered(sorted, expected);
        let missing_count: usize = missing.iter().map(SequenceRange::len).sum();
        let mut shown: Vec<String> = missing
            .iter()
            .take(MAX_REPORTED_GAPS)
            .map(SequenceRange::to_string)
            .collect();
        if missing.len() > MAX_REPORTED_GAPS {
            shown.push(format!("等 {} 处", missing.len()));
        }
        return Some(format!(
            "期望 {} 题，实际 {} 题，缺少 {} 题: {}",
            expected.len(),
            sorted.len(),
            missing_count,
            shown.join(", ")
        ));
    }

    None
}
