use crate::models::question::Question;
use crate::models::range::SequenceRange;
use crate::models::set::QuestionSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 题库元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankMetadata {
    /// 主题名称
    pub topic: String,
    /// 文件名使用的主题短名，缺省时由 topic 生成
    #[serde(default, alias = "topic_slug", skip_serializing_if = "Option::is_none")]
    pub topic_slug: Option<String>,
    /// 课程体系，所有题目必须一致
    #[serde(alias = "curriculum_system")]
    pub curriculum_system: String,
    /// 题库应有的题目总数
    #[serde(alias = "total_questions")]
    pub total_questions: u32,
    /// 声明后所有题目必须一致
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u8>,
}

/// 主题中没有字母数字时使用的短名
const DEFAULT_SLUG: &str = "question-bank";

impl BankMetadata {
    pub fn new(
        topic: impl Into<String>,
        curriculum_system: impl Into<String>,
        total_questions: u32,
    ) -> Self {
        Self {
            topic: topic.into(),
            topic_slug: None,
            curriculum_system: curriculum_system.into(),
            total_questions,
            subject: None,
            strand: None,
            year: None,
        }
    }

    /// 主题短名，如 "Energy Forms & Transformations" -> "energy-forms-transformations"
    pub fn slug(&self) -> String {
        if let Some(slug) = self.topic_slug.as_deref().filter(|s| !s.is_empty()) {
            return slug.to_string();
        }

        let mut slug = String::with_capacity(self.topic.len());
        for c in self.topic.chars() {
            if c.is_alphanumeric() {
                slug.extend(c.to_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        if slug.is_empty() {
            DEFAULT_SLUG.to_string()
        } else {
            slug.to_string()
        }
    }
}

/// 组装完成的题库（只读）
///
/// 题目按全局题号 1..N 排列，questionId 唯一，题目数等于 `metadata.total_questions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    metadata: BankMetadata,
    questions: Vec<Question>,
}

impl QuestionBank {
    /// 只由 `services::bank_assembler` 在检查通过后构造
    pub(crate) fn new(metadata: BankMetadata, questions: Vec<Question>) -> Self {
        Self {
            metadata,
            questions,
        }
    }

    pub fn metadata(&self) -> &BankMetadata {
        &self.metadata
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question_ids(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.question_id.as_str())
    }

    /// 按 setId 统计题目数量
    pub fn set_distribution(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for question in &self.questions {
            *counts
                .entry(question.paper_metadata.set_id.clone())
                .or_insert(0) += 1;
        }
        counts
    }
}

/// 尚未收齐的题库
///
/// 保存已通过检查的题组，后续题组到达后可直接续组，无需重新校验
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteBank {
    pub(crate) metadata: BankMetadata,
    pub(crate) sets: Vec<QuestionSet>,
    pub(crate) filled: Vec<SequenceRange>,
    pub(crate) missing: Vec<SequenceRange>,
}

impl IncompleteBank {
    pub fn metadata(&self) -> &BankMetadata {
        &self.metadata
    }

    /// 已接收的题组（按范围顺序）
    pub fn sets(&self) -> &[QuestionSet] {
        &self.sets
    }

    /// 已覆盖的题号区块
    pub fn filled(&self) -> &[SequenceRange] {
        &self.filled
    }

    /// 缺失的题号区块
    pub fn missing(&self) -> &[SequenceRange] {
        &self.missing
    }

    /// 已接收的题目数
    pub fn question_count(&self) -> usize {
        self.sets.iter().map(QuestionSet::len).sum()
    }

    /// 缺失的题目数
    pub fn missing_count(&self) -> usize {
        self.missing.iter().map(SequenceRange::len).sum()
    }
}

/// 组装结果：完整题库或可续组的半成品
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyOutcome {
    Complete(QuestionBank),
    Incomplete(IncompleteBank),
}

impl AssemblyOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, AssemblyOutcome::Complete(_))
    }

    pub fn into_complete(self) -> Option<QuestionBank> {
        match self {
            AssemblyOutcome::Complete(bank) => Some(bank),
            AssemblyOutcome::Incomplete(_) => None,
        }
    }

    pub fn into_incomplete(self) -> Option<IncompleteBank> {
        match self {
            AssemblyOutcome::Complete(_) => None,
            AssemblyOutcome::Incomplete(partial) => Some(partial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_topic() {
        let meta = BankMetadata::new("Energy Forms & Transformations", "AC v9", 80);
        assert_eq!(meta.slug(), "energy-forms-transformations");

        let mut meta = BankMetadata::new("States of Matter", "AC v9", 30);
        meta.topic_slug = Some("year8-som".to_string());
        assert_eq!(meta.slug(), "year8-som");
    }

    #[test]
    fn test_slug_never_empty() {
        let meta = BankMetadata::new("能量 & 转化", "AC v9", 10);
        assert_eq!(meta.slug(), "能量-转化");

        let meta = BankMetadata::new(" & ?! ", "AC v9", 10);
        assert_eq!(meta.slug(), "question-bank");

        let mut meta = BankMetadata::new("--", "AC v9", 10);
        meta.topic_slug = Some(String::new());
        assert_eq!(meta.slug(), "question-bank");
    }
}
