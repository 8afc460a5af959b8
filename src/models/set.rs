use crate::models::question::Question;
use crate::models::range::SequenceRange;
use serde_json::Value;

/// 生产方交付的一批原始记录
#[derive(Debug, Clone)]
pub struct RawSet {
    /// 题组名称
    pub name: String,
    /// 声明的题号范围，如 Q11-Q20
    pub range: SequenceRange,
    /// 未经校验的原始记录
    pub records: Vec<Value>,
}

impl RawSet {
    pub fn new(name: impl Into<String>, range: SequenceRange, records: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            range,
            records,
        }
    }
}

/// 已整理的题组
///
/// 题目全部通过校验，按题号升序排列，题号恰好覆盖 `range`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    name: String,
    range: SequenceRange,
    questions: Vec<Question>,
}

impl QuestionSet {
    /// 只由 `services::set_normalizer` 在检查通过后构造
    pub(crate) fn new(name: String, range: SequenceRange, questions: Vec<Question>) -> Self {
        Self {
            name,
            range,
            questions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> SequenceRange {
        self.range
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

    pub(crate) fn into_questions(self) -> Vec<Question> {
        self.questions
    }
}
