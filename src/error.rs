//! 错误类型
//!
//! 按流水线阶段划分：
//! - `ValidationFailure`：单条记录结构校验失败（SchemaViolation）
//! - `NormalizeFailure`：题组整理失败（整组拒收，不保留部分结果）
//! - `AssembleFailure`：题库组装失败（整库中止）
//! - `StoreError`：单个写入操作失败（只影响该操作）
//!
//! 题库不完整不是错误，见 `models::bank::AssemblyOutcome`。

use crate::models::SequenceRange;
use thiserror::Error;

/// 单条记录校验失败
///
/// 只记录第一个违规字段，字段名使用存储格式中的路径（如 `hints[1].level`）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("字段 `{field}` 校验失败: {reason}")]
pub struct ValidationFailure {
    /// 违规字段路径
    pub field: String,
    /// 可读的失败原因
    pub reason: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 题组整理失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeFailure {
    /// 某条记录未通过结构校验
    #[error(
        "题组 {set_name} 第 {index} 条记录 ({}) 结构校验失败: {failure}",
        .question_id.as_deref().unwrap_or("无ID")
    )]
    SchemaViolation {
        set_name: String,
        /// 记录在原始批次中的下标（从 0 开始）
        index: usize,
        question_id: Option<String>,
        failure: ValidationFailure,
    },

    /// 题号与声明的范围不一致
    #[error("题组 {set_name} 题号与声明范围 {expected} 不符: {reason}")]
    SequenceMismatch {
        set_name: String,
        expected: SequenceRange,
        /// 排序后的实际题号
        found: Vec<u32>,
        reason: String,
    },
}

impl NormalizeFailure {
    /// 出错的题组名称
    pub fn set_name(&self) -> &str {
        match self {
            NormalizeFailure::SchemaViolation { set_name, .. }
            | NormalizeFailure::SequenceMismatch { set_name, .. } => set_name,
        }
    }
}

/// 题库组装失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleFailure {
    /// 不同位置出现相同的 questionId（不自动重命名）
    #[error("题目ID冲突: {question_id} 同时出现在题组 {first_set} 和 {second_set}")]
    IdentifierCollision {
        question_id: String,
        first_set: String,
        second_set: String,
    },

    /// 题组范围与前一个题组重叠
    #[error("题组 {set_name} 的范围 {range} 与题组 {previous_set} 的范围 {previous_range} 重叠")]
    RangeOverlap {
        set_name: String,
        range: SequenceRange,
        previous_set: String,
        previous_range: SequenceRange,
    },

    /// 题组顺序与范围顺序不一致
    #[error("题组 {set_name} 的范围 {range} 排在题组 {previous_set} ({previous_range}) 之后，顺序错误")]
    RangeOutOfOrder {
        set_name: String,
        range: SequenceRange,
        previous_set: String,
        previous_range: SequenceRange,
    },

    /// 题组范围超出题库声明的总题数
    #[error("题组 {set_name} 的范围 {range} 超出题库总题数 {total}")]
    RangeOutOfBounds {
        set_name: String,
        range: SequenceRange,
        total: u32,
    },

    /// 题目的课程信息与题库元数据不一致
    #[error("题目 {question_id} (题组 {set_name}) 的 curriculum.{field} 为 {found:?}，题库要求 {expected:?}")]
    CurriculumMismatch {
        question_id: String,
        set_name: String,
        field: String,
        expected: String,
        found: String,
    },
}

/// 存储写入/读取失败
#[derive(Debug, Error)]
pub enum StoreError {
    /// 文件读写失败
    #[error("存储 I/O 失败 ({key}): {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// 文档序列化失败
    #[error("文档序列化失败 ({key}): {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// 键不能作为文档名
    #[error("非法的文档键: {key:?}")]
    InvalidKey { key: String },

    /// 存储拒绝写入
    #[error("存储拒绝写入 ({key}): {reason}")]
    Rejected { key: String, reason: String },
}

impl StoreError {
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            key: key.into(),
            source,
        }
    }
}

/// 范围标签解析失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("无法解析题号范围 {label:?}: {reason}")]
pub struct RangeParseError {
    pub label: String,
    pub reason: String,
}

impl RangeParseError {
    pub fn new(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            reason: reason.into(),
        }
    }
}
