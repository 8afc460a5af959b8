//! 质量检查服务 - 业务能力层
//!
//! 对已组装的题库做非阻断的质量检查，结果只用于提示人工复核：
//! - 内容层：题干/解析长度、LaTeX `$` 配对、花括号配对
//! - 教学层：提示数量、第一条提示是否泄露答案、解析是否说明理由
//! - 展示层：超长单词、超长公式、过宽表格
//!
//! 与 `schema_validator` 不同，这里的问题（包括错误级别）都不会拒收题目。

use crate::models::question::Question;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

const MIN_STEM_CHARS: usize = 20;
const MAX_STEM_CHARS: usize = 2000;
const MIN_SOLUTION_CHARS: usize = 50;
const MIN_HINTS: usize = 2;
/// 比较提示与正确选项时取选项的前若干字符
const ANSWER_PREFIX_CHARS: usize = 20;
/// 超过该长度的解析视为已充分说明
const EXPLAINED_SOLUTION_CHARS: usize = 200;
const EXPLANATION_MARKERS: [&str; 4] = ["because", "This is", "explains", "**"];
const MAX_WORD_CHARS: usize = 30;
const MAX_EQUATION_CHARS: usize = 100;
const MAX_TABLE_COLUMNS: usize = 5;

/// 检查层
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualityLayer {
    Content,
    Pedagogy,
    Presentation,
}

impl fmt::Display for QualityLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QualityLayer::Content => "内容",
            QualityLayer::Pedagogy => "教学",
            QualityLayer::Presentation => "展示",
        };
        f.write_str(label)
    }
}

/// 问题级别（都不阻断上传）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("错误"),
            Severity::Warning => f.write_str("警告"),
        }
    }
}

/// 单个质量问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityIssue {
    pub question_id: String,
    pub layer: QualityLayer,
    pub severity: Severity,
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {} | {}: {}",
            self.layer, self.severity, self.question_id, self.field, self.message
        )
    }
}

/// 整个题库的检查结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityReport {
    pub issues: Vec<QualityIssue>,
    /// 题型 -> 题目数
    pub type_distribution: BTreeMap<&'static str, usize>,
    /// 难度 -> 题目数
    pub difficulty_distribution: BTreeMap<u8, usize>,
}

impl QualityReport {
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }
}

/// 检查整个题库
pub fn check_bank(questions: &[Question]) -> QualityReport {
    let mut report = QualityReport::default();
    for question in questions {
        report.issues.extend(check_question(question));
        *report
            .type_distribution
            .entry(question.question_type().code())
            .or_insert(0) += 1;
        *report
            .difficulty_distribution
            .entry(question.difficulty)
            .or_insert(0) += 1;
    }
    report
}

/// 检查单个题目，按 内容 → 教学 → 展示 的顺序返回全部问题
pub fn check_question(question: &Question) -> Vec<QualityIssue> {
    let mut checker = Checker {
        question,
        issues: Vec::new(),
    };
    checker.content();
    checker.pedagogy();
    checker.presentation();
    checker.issues
}

struct Checker<'a> {
    question: &'a Question,
    issues: Vec<QualityIssue>,
}

impl Checker<'_> {
    fn push(
        &mut self,
        layer: QualityLayer,
        severity: Severity,
        field: &'static str,
        message: String,
    ) {
        self.issues.push(QualityIssue {
            question_id: self.question.question_id.clone(),
            layer,
            severity,
            field,
            message,
        });
    }

    fn content(&mut self) {
        use QualityLayer::Content;

        let stem_chars = self.question.stem.chars().count();
        if stem_chars < MIN_STEM_CHARS {
            self.push(
                Content,
                Severity::Warning,
                "stem",
                format!("题干过短（{} 字符）", stem_chars),
            );
        }
        if stem_chars > MAX_STEM_CHARS {
            self.push(
                Content,
                Severity::Warning,
                "stem",
                format!("题干过长（{} 字符）", stem_chars),
            );
        }

        let solution_chars = self.question.solution.chars().count();
        if solution_chars < MIN_SOLUTION_CHARS {
            self.push(
                Content,
                Severity::Warning,
                "solution",
                format!("解析过短（{} 字符）", solution_chars),
            );
        }

        let text = format!("{} {}", self.question.stem, self.question.solution);
        if text.matches('$').count() % 2 != 0 {
            self.push(
                Content,
                Severity::Error,
                "content",
                "LaTeX 公式中的 $ 未配对".to_string(),
            );
        }
        if text.matches('{').count() != text.matches('}').count() {
            self.push(
                Content,
                Severity::Warning,
                "content",
                "花括号可能未闭合".to_string(),
            );
        }
    }

    fn pedagogy(&mut self) {
        use QualityLayer::Pedagogy;

        let hints = &self.question.hints;
        if hints.len() < MIN_HINTS {
            self.push(
                Pedagogy,
                Severity::Warning,
                "hints",
                format!("只有 {} 条提示，建议 2-3 条", hints.len()),
            );
        }

        if self.question.question_type().is_choice() && hints.len() >= MIN_HINTS {
            if let Some(answer) = self.question.correct_option() {
                let prefix: String = answer
                    .to_lowercase()
                    .chars()
                    .take(ANSWER_PREFIX_CHARS)
                    .collect();
                if hints[0].content.to_lowercase().contains(&prefix) {
                    self.push(
                        Pedagogy,
                        Severity::Warning,
                        "hints",
                        "第 1 条提示可能直接透露正确选项".to_string(),
                    );
                }
            }
        }

        let solution = &self.question.solution;
        let explained = EXPLANATION_MARKERS.iter().any(|m| solution.contains(m))
            || solution.chars().count() > EXPLAINED_SOLUTION_CHARS;
        if !explained {
            self.push(
                Pedagogy,
                Severity::Warning,
                "solution",
                "解析可能没有充分说明理由".to_string(),
            );
        }
    }

    fn presentation(&mut self) {
        use QualityLayer::Presentation;

        let stem = &self.question.stem;
        if stem
            .split(' ')
            .any(|word| word.chars().count() > MAX_WORD_CHARS)
        {
            self.push(
                Presentation,
                Severity::Warning,
                "stem",
                "包含超长单词，移动端可能溢出".to_string(),
            );
        }

        let first_table_row = stem
            .lines()
            .find(|line| line.contains('|') && line.trim_start().starts_with('|'));
        if let Some(row) = first_table_row {
            let columns = row.matches('|').count().saturating_sub(1);
            if columns > MAX_TABLE_COLUMNS {
                self.push(
                    Presentation,
                    Severity::Warning,
                    "stem",
                    format!("表格有 {} 列，移动端可能放不下", columns),
                );
            }
        }

        if let Ok(re) = Regex::new(r"\$[^$]+\$") {
            let long_equations = re
                .find_iter(stem)
                .filter(|m| m.as_str().chars().count() > MAX_EQUATION_CHARS)
                .count();
            for _ in 0..long_equations {
                self.push(
                    Presentation,
                    Severity::Warning,
                    "stem",
                    "公式过长，移动端可能需要换行".to_string(),
                );
            }
        }
    }
}
