//! 结构校验服务 - 业务能力层
//!
//! 只负责"校验一条原始记录"：
//! - 输入为生产方给出的松散 JSON 记录
//! - 输出为带题型形态的 `Question`，或第一个违规字段
//! - 纯函数，不修改输入，重复校验结果相同
//!
//! 校验顺序：
//! 1. 必填字段存在且类型正确
//! 2. 题型可识别，且选项字段与题型一致
//! 3. difficulty / estimatedTime 等数值为正且在范围内
//! 4. 提示级别从 1 开始连续递增
//! 5. 课程编码为非空字符串

use crate::error::ValidationFailure;
use crate::models::question::{
    Curriculum, Hint, PaperMetadata, Question, QuestionKind, QuestionStatus, QuestionType,
};
use serde_json::{Map, Value};

/// 难度上限（1-5 级）
pub const MAX_DIFFICULTY: i64 = 5;

/// 年级上限
pub const MAX_YEAR_LEVEL: i64 = 12;

pub type ValidationResult = Result<Question, ValidationFailure>;

/// 校验单条原始记录
pub fn validate(raw: &Value) -> ValidationResult {
    let record = raw
        .as_object()
        .ok_or_else(|| ValidationFailure::new("<record>", "记录必须是 JSON 对象"))?;

    // ========== 1. 必填字段 ==========
    let question_id = required_text(record, "questionId", "questionId")?;
    let type_label = required_str(record, "questionType", "questionType")?;
    let stem = required_text(record, "stem", "stem")?;
    let solution = required_text(record, "solution", "solution")?;
    let difficulty = required_int(record, "difficulty", "difficulty")?;
    let estimated_time = required_int(record, "estimatedTime", "estimatedTime")?;
    let curriculum = read_curriculum(record)?;
    let hints = read_hints(record)?;
    let paper = read_paper_metadata(record)?;
    let status_label = required_str(record, "status", "status")?;
    let status = QuestionStatus::from_label(status_label).ok_or_else(|| {
        ValidationFailure::new("status", format!("未知的状态 {:?}", status_label))
    })?;

    // ========== 2. 题型 ==========
    let question_type = QuestionType::from_label(type_label).ok_or_else(|| {
        ValidationFailure::new("questionType", format!("未知的题型 {:?}", type_label))
    })?;
    let kind = read_kind(record, question_type)?;

    // ========== 3. 数值范围 ==========
    let difficulty = check_range("difficulty", difficulty, 1, MAX_DIFFICULTY)? as u8;
    let estimated_time =
        check_range("estimatedTime", estimated_time, 1, u32::MAX as i64)? as u32;
    let year = check_range("curriculum.year", curriculum.year, 1, MAX_YEAR_LEVEL)? as u8;
    let sequence_in_paper = check_range(
        "paperMetadata.sequenceInPaper",
        paper.sequence_in_paper,
        1,
        u32::MAX as i64,
    )? as u32;

    // ========== 4. 提示级别 ==========
    let mut checked_hints = Vec::with_capacity(hints.len());
    for (i, hint) in hints.into_iter().enumerate() {
        let expected = i as i64 + 1;
        if hint.level != expected {
            return Err(ValidationFailure::new(
                format!("hints[{}].level", i),
                format!(
                    "提示级别应从 1 开始连续递增，期望 {}，实际为 {}",
                    expected, hint.level
                ),
            ));
        }
        checked_hints.push(Hint {
            level: expected as u32,
            content: hint.content,
            reveals_critical_info: hint.reveals_critical_info,
        });
    }

    // ========== 5. 课程编码 ==========
    let codes = read_codes(curriculum.codes)?;

    Ok(Question {
        question_id,
        kind,
        stem,
        solution,
        difficulty,
        estimated_time,
        curriculum: Curriculum {
            system: curriculum.system,
            codes,
            year,
            subject: curriculum.subject,
            strand: curriculum.strand,
            substrand: curriculum.substrand,
        },
        hints: checked_hints,
        paper_metadata: PaperMetadata {
            set_id: paper.set_id,
            sequence_in_paper,
            section: paper.section,
        },
        status,
    })
}

// ========== 字段读取 ==========

/// 课程信息（数值尚未做范围检查）
struct RawCurriculum<'a> {
    system: String,
    codes: &'a [Value],
    year: i64,
    subject: String,
    strand: String,
    substrand: Option<String>,
}

struct RawHint {
    level: i64,
    content: String,
    reveals_critical_info: bool,
}

struct RawPaperMetadata {
    set_id: String,
    sequence_in_paper: i64,
    section: Option<String>,
}

/// null 视为缺失
fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn missing(path: &str) -> ValidationFailure {
    ValidationFailure::new(path, "缺少必填字段")
}

fn required_str<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a str, ValidationFailure> {
    field(map, key)
        .ok_or_else(|| missing(path))?
        .as_str()
        .ok_or_else(|| ValidationFailure::new(path, "必须是字符串"))
}

/// 非空字符串
fn required_text(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, ValidationFailure> {
    let text = required_str(map, key, path)?;
    if text.trim().is_empty() {
        return Err(ValidationFailure::new(path, "不能为空"));
    }
    Ok(text.to_string())
}

fn optional_text(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, ValidationFailure> {
    match field(map, key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ValidationFailure::new(path, "必须是字符串")),
    }
}

fn required_int(map: &Map<String, Value>, key: &str, path: &str) -> Result<i64, ValidationFailure> {
    field(map, key)
        .ok_or_else(|| missing(path))?
        .as_i64()
        .ok_or_else(|| ValidationFailure::new(path, "必须是整数"))
}

fn required_object<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ValidationFailure> {
    field(map, key)
        .ok_or_else(|| missing(path))?
        .as_object()
        .ok_or_else(|| ValidationFailure::new(path, "必须是对象"))
}

fn required_array<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a [Value], ValidationFailure> {
    field(map, key)
        .ok_or_else(|| missing(path))?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ValidationFailure::new(path, "必须是数组"))
}

/// 年级可以是整数或数字字符串
fn read_year(map: &Map<String, Value>) -> Result<i64, ValidationFailure> {
    const PATH: &str = "curriculum.year";
    match field(map, "year").ok_or_else(|| missing(PATH))? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ValidationFailure::new(PATH, "必须是整数")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationFailure::new(PATH, format!("无法解析年级 {:?}", s))),
        _ => Err(ValidationFailure::new(PATH, "必须是整数或数字字符串")),
    }
}

fn read_curriculum(record: &Map<String, Value>) -> Result<RawCurriculum<'_>, ValidationFailure> {
    let map = required_object(record, "curriculum", "curriculum")?;
    Ok(RawCurriculum {
        system: required_text(map, "system", "curriculum.system")?,
        codes: required_array(map, "codes", "curriculum.codes")?,
        year: read_year(map)?,
        subject: required_text(map, "subject", "curriculum.subject")?,
        strand: required_text(map, "strand", "curriculum.strand")?,
        substrand: optional_text(map, "substrand", "curriculum.substrand")?,
    })
}

fn read_hints(record: &Map<String, Value>) -> Result<Vec<RawHint>, ValidationFailure> {
    let items = required_array(record, "hints", "hints")?;
    let mut hints = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let path = format!("hints[{}]", i);
        let map = item
            .as_object()
            .ok_or_else(|| ValidationFailure::new(path.as_str(), "必须是对象"))?;

        let reveals_path = format!("{}.revealsCriticalInfo", path);
        let reveals_critical_info = field(map, "revealsCriticalInfo")
            .ok_or_else(|| missing(&reveals_path))?
            .as_bool()
            .ok_or_else(|| ValidationFailure::new(reveals_path.as_str(), "必须是布尔值"))?;

        hints.push(RawHint {
            level: required_int(map, "level", &format!("{}.level", path))?,
            content: required_text(map, "content", &format!("{}.content", path))?,
            reveals_critical_info,
        });
    }

    Ok(hints)
}

fn read_paper_metadata(record: &Map<String, Value>) -> Result<RawPaperMetadata, ValidationFailure> {
    let map = required_object(record, "paperMetadata", "paperMetadata")?;
    Ok(RawPaperMetadata {
        set_id: required_text(map, "setId", "paperMetadata.setId")?,
        sequence_in_paper: required_int(map, "sequenceInPaper", "paperMetadata.sequenceInPaper")?,
        section: optional_text(map, "section", "paperMetadata.section")?,
    })
}

/// 根据题型读取选项字段
fn read_kind(
    record: &Map<String, Value>,
    question_type: QuestionType,
) -> Result<QuestionKind, ValidationFailure> {
    let Some(free) = QuestionKind::free_response(question_type) else {
        return read_choice(record);
    };

    if field(record, "options").is_some() || field(record, "mcqOptions").is_some() {
        return Err(ValidationFailure::new(
            "options",
            format!("{} 题型不应包含选项", question_type),
        ));
    }
    if field(record, "correctAnswer").is_some() {
        return Err(ValidationFailure::new(
            "correctAnswer",
            format!("{} 题型不应包含 correctAnswer", question_type),
        ));
    }
    Ok(free)
}

fn read_choice(record: &Map<String, Value>) -> Result<QuestionKind, ValidationFailure> {
    // 生产方旧格式：mcqOptions: [{ id, text, isCorrect, feedback }]
    if field(record, "options").is_none() && field(record, "mcqOptions").is_some() {
        return read_mcq_options(record);
    }

    let items = required_array(record, "options", "options")?;
    if items.is_empty() {
        return Err(ValidationFailure::new("options", "选择题的选项不能为空"));
    }

    let mut options = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let text = item
            .as_str()
            .ok_or_else(|| ValidationFailure::new(format!("options[{}]", i), "必须是字符串"))?;
        options.push(text.to_string());
    }

    let correct_answer = read_correct_answer(record, options.len())?;

    Ok(QuestionKind::MultipleChoice {
        options,
        correct_answer,
    })
}

fn read_correct_answer(
    record: &Map<String, Value>,
    option_count: usize,
) -> Result<usize, ValidationFailure> {
    let index = required_int(record, "correctAnswer", "correctAnswer")?;
    if index < 0 || index as usize >= option_count {
        return Err(ValidationFailure::new(
            "correctAnswer",
            format!("下标 {} 超出选项范围 [0, {})", index, option_count),
        ));
    }
    Ok(index as usize)
}

fn read_mcq_options(record: &Map<String, Value>) -> Result<QuestionKind, ValidationFailure> {
    let items = required_array(record, "mcqOptions", "mcqOptions")?;
    if items.is_empty() {
        return Err(ValidationFailure::new("mcqOptions", "选择题的选项不能为空"));
    }

    let mut options = Vec::with_capacity(items.len());
    let mut correct = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let path = format!("mcqOptions[{}]", i);
        let map = item
            .as_object()
            .ok_or_else(|| ValidationFailure::new(path.as_str(), "必须是对象"))?;
        options.push(required_str(map, "text", &format!("{}.text", path))?.to_string());
        match field(map, "isCorrect") {
            None | Some(Value::Bool(false)) => {}
            Some(Value::Bool(true)) => correct.push(i),
            Some(_) => {
                return Err(ValidationFailure::new(
                    format!("{}.isCorrect", path),
                    "必须是布尔值",
                ))
            }
        }
    }

    let correct_answer = match correct.as_slice() {
        [index] => *index,
        _ => {
            return Err(ValidationFailure::new(
                "mcqOptions",
                format!("应恰好有 1 个正确选项，实际有 {} 个", correct.len()),
            ))
        }
    };

    if field(record, "correctAnswer").is_some()
        && read_correct_answer(record, options.len())? != correct_answer
    {
        return Err(ValidationFailure::new(
            "correctAnswer",
            "与 mcqOptions 中标记的正确选项不一致",
        ));
    }

    Ok(QuestionKind::MultipleChoice {
        options,
        correct_answer,
    })
}

fn read_codes(codes: &[Value]) -> Result<Vec<String>, ValidationFailure> {
    if codes.is_empty() {
        return Err(ValidationFailure::new(
            "curriculum.codes",
            "至少需要一个课程编码",
        ));
    }

    codes
        .iter()
        .enumerate()
        .map(|(i, code)| match code.as_str() {
            Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
            Some(_) => Err(ValidationFailure::new(
                format!("curriculum.codes[{}]", i),
                "课程编码不能为空",
            )),
            None => Err(ValidationFailure::new(
                format!("curriculum.codes[{}]", i),
                "课程编码必须是字符串",
            )),
        })
        .collect()
}

fn check_range(path: &str, value: i64, min: i64, max: i64) -> Result<i64, ValidationFailure> {
    if value < min || value > max {
        return Err(ValidationFailure::new(
            path,
            format!("取值 {} 超出范围 [{}, {}]", value, min, max),
        ));
    }
    Ok(value)
}
