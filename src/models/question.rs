use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    /// 单选题
    MultipleChoice,
    /// 简答题
    ShortAnswer,
    /// 论述题
    ExtendedResponse,
    /// 解释题
    Explanation,
    /// 方程输入
    EquationEntry,
    /// 多步计算
    MultiStepMath,
    /// 书写解题过程
    WorkedSolution,
}

/// 生产方使用过的题型写法 -> 题型
static QUESTION_TYPE_LABELS: phf::Map<&'static str, QuestionType> = phf_map! {
    "MCQ" => QuestionType::MultipleChoice,
    "mcq" => QuestionType::MultipleChoice,
    "multiple-choice" => QuestionType::MultipleChoice,
    "SHORT_ANSWER" => QuestionType::ShortAnswer,
    "short-answer" => QuestionType::ShortAnswer,
    "EXTENDED_RESPONSE" => QuestionType::ExtendedResponse,
    "extended-response" => QuestionType::ExtendedResponse,
    "EXPLANATION" => QuestionType::Explanation,
    "explanation" => QuestionType::Explanation,
    "EQUATION_ENTRY" => QuestionType::EquationEntry,
    "equation-entry" => QuestionType::EquationEntry,
    "MULTI_STEP_MATH" => QuestionType::MultiStepMath,
    "multi-step-math" => QuestionType::MultiStepMath,
    "WORKED_SOLUTION" => QuestionType::WorkedSolution,
    "worked-solution" => QuestionType::WorkedSolution,
};

impl QuestionType {
    /// 从标签解析题型（区分大小写）
    pub fn from_label(label: &str) -> Option<Self> {
        QUESTION_TYPE_LABELS.get(label).copied()
    }

    /// 存储中使用的标准写法
    pub fn code(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "MCQ",
            QuestionType::ShortAnswer => "SHORT_ANSWER",
            QuestionType::ExtendedResponse => "EXTENDED_RESPONSE",
            QuestionType::Explanation => "EXPLANATION",
            QuestionType::EquationEntry => "EQUATION_ENTRY",
            QuestionType::MultiStepMath => "MULTI_STEP_MATH",
            QuestionType::WorkedSolution => "WORKED_SOLUTION",
        }
    }

    /// 是否需要 options / correctAnswer
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionType::MultipleChoice)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 按题型区分的题目形态
///
/// 序列化时展开到题目顶层：`questionType` 作为标签，选择题额外带 `options` 和 `correctAnswer`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "questionType")]
pub enum QuestionKind {
    #[serde(rename = "MCQ", rename_all = "camelCase")]
    MultipleChoice {
        options: Vec<String>,
        correct_answer: usize,
    },
    #[serde(rename = "SHORT_ANSWER")]
    ShortAnswer,
    #[serde(rename = "EXTENDED_RESPONSE")]
    ExtendedResponse,
    #[serde(rename = "EXPLANATION")]
    Explanation,
    #[serde(rename = "EQUATION_ENTRY")]
    EquationEntry,
    #[serde(rename = "MULTI_STEP_MATH")]
    MultiStepMath,
    #[serde(rename = "WORKED_SOLUTION")]
    WorkedSolution,
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::ShortAnswer => QuestionType::ShortAnswer,
            QuestionKind::ExtendedResponse => QuestionType::ExtendedResponse,
            QuestionKind::Explanation => QuestionType::Explanation,
            QuestionKind::EquationEntry => QuestionType::EquationEntry,
            QuestionKind::MultiStepMath => QuestionType::MultiStepMath,
            QuestionKind::WorkedSolution => QuestionType::WorkedSolution,
        }
    }

    /// 非选择题的形态；选择题返回 None
    pub fn free_response(question_type: QuestionType) -> Option<Self> {
        match question_type {
            QuestionType::MultipleChoice => None,
            QuestionType::ShortAnswer => Some(QuestionKind::ShortAnswer),
            QuestionType::ExtendedResponse => Some(QuestionKind::ExtendedResponse),
            QuestionType::Explanation => Some(QuestionKind::Explanation),
            QuestionType::EquationEntry => Some(QuestionKind::EquationEntry),
            QuestionType::MultiStepMath => Some(QuestionKind::MultiStepMath),
            QuestionType::WorkedSolution => Some(QuestionKind::WorkedSolution),
        }
    }
}

/// 课程分类信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    /// 课程体系，如 "Australian Curriculum v9"
    pub system: String,
    /// 课程编码，如 ["ACSSU155"]
    pub codes: Vec<String>,
    /// 年级
    pub year: u8,
    pub subject: String,
    pub strand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substrand: Option<String>,
}

/// 提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    /// 提示级别，从 1 开始连续递增
    pub level: u32,
    pub content: String,
    /// 该提示是否直接透露答案
    pub reveals_critical_info: bool,
}

/// 题目所属题组及在题组中的位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperMetadata {
    pub set_id: String,
    /// 题号（从 1 开始）；组装完成后为题库内的全局题号
    pub sequence_in_paper: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

/// 题目生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Active,
    Published,
    Draft,
    Retired,
}

impl QuestionStatus {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "active" => Some(QuestionStatus::Active),
            "published" => Some(QuestionStatus::Published),
            "draft" => Some(QuestionStatus::Draft),
            "retired" => Some(QuestionStatus::Retired),
            _ => None,
        }
    }
}

/// 通过校验的题目
///
/// 只能由 `services::schema_validator::validate` 从原始记录构造，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    pub stem: String,
    pub solution: String,
    /// 难度 1-5
    pub difficulty: u8,
    /// 预计用时（秒）
    pub estimated_time: u32,
    pub curriculum: Curriculum,
    pub hints: Vec<Hint>,
    pub paper_metadata: PaperMetadata,
    pub status: QuestionStatus,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    pub fn sequence(&self) -> u32 {
        self.paper_metadata.sequence_in_paper
    }

    /// 选择题的正确选项文本
    pub fn correct_option(&self) -> Option<&str> {
        match &self.kind {
            QuestionKind::MultipleChoice {
                options,
                correct_answer,
            } => options.get(*correct_answer).map(String::as_str),
            _ => None,
        }
    }
}
