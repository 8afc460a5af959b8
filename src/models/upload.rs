use crate::models::question::Question;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// 存储中某个键对应的内容
#[derive(Debug, Clone, PartialEq)]
pub enum StoredDocument {
    /// 只知道已持久化，没有内容（如回滚文件中的 ID 列表）
    Unknown,
    /// 存储返回的文档内容
    Content(Value),
    /// 文档存在，但内容读取或解析失败
    Unreadable(String),
}

/// 存储中已持久化的题目，键为 questionId
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadState {
    persisted: HashMap<String, StoredDocument>,
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只知道键、不知道内容的状态（如回滚文件中的 ID 列表）
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            persisted: ids
                .into_iter()
                .map(|id| (id.into(), StoredDocument::Unknown))
                .collect(),
        }
    }

    /// 记录一个已持久化的题目；`document` 为 None 表示内容未知
    pub fn insert(&mut self, question_id: impl Into<String>, document: Option<Value>) {
        let stored = match document {
            Some(value) => StoredDocument::Content(value),
            None => StoredDocument::Unknown,
        };
        self.persisted.insert(question_id.into(), stored);
    }

    /// 记录一个存在但内容无法读取的文档
    pub fn insert_unreadable(
        &mut self,
        question_id: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.persisted.insert(
            question_id.into(),
            StoredDocument::Unreadable(reason.into()),
        );
    }

    pub fn get(&self, question_id: &str) -> Option<&StoredDocument> {
        self.persisted.get(question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.persisted.contains_key(question_id)
    }

    /// 已知的存储内容；未持久化、内容未知或无法读取时为 None
    pub fn document(&self, question_id: &str) -> Option<&Value> {
        match self.persisted.get(question_id) {
            Some(StoredDocument::Content(value)) => Some(value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.persisted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persisted.is_empty()
    }
}

/// 单个幂等写入操作：按 questionId upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOperation {
    pub question_id: String,
    pub question: Question,
}

/// 存储中的内容与题库版本不一致
///
/// 只作为警告上报，需显式确认后才会覆盖
#[derive(Debug, Clone, PartialEq)]
pub struct UploadDivergence {
    pub question_id: String,
    /// 存储中的内容；文档无法读取时为 None
    pub stored: Option<Value>,
    pub local: Question,
}

impl fmt::Display for UploadDivergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stored {
            Some(_) => write!(
                f,
                "题目 {} 在存储中的内容与题库版本不一致，需要人工确认",
                self.question_id
            ),
            None => write!(
                f,
                "题目 {} 在存储中的文档无法读取，需要人工确认",
                self.question_id
            ),
        }
    }
}

/// 上传计划
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadPlan {
    /// 需要执行的写入（彼此无依赖，可任意顺序并发执行）
    pub operations: Vec<WriteOperation>,
    /// 内容不一致、未列入写入的题目
    pub divergences: Vec<UploadDivergence>,
    /// 已持久化且无需写入的题目数
    pub already_persisted: usize,
}

impl UploadPlan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
