//! 题库组装服务 - 业务能力层
//!
//! 把按顺序排列的 `QuestionSet` 合并为一个 `QuestionBank`：
//! 1. 检查各题组范围：在总题数之内、按顺序递增、互不重叠
//! 2. 检查所有题组之间的 questionId 唯一（冲突直接失败，不自动改名）
//! 3. 检查课程信息与题库元数据一致
//! 4. 范围有缺口时返回 `IncompleteBank`，记录已覆盖和缺失的区块
//! 5. 收齐后按累计位置重新分配全局题号
//!
//! 必须拿到全部题组后才能做冲突检查，所以这里是整个流水线唯一的同步点。

use crate::error::AssembleFailure;
use crate::models::bank::{AssemblyOutcome, BankMetadata, IncompleteBank, QuestionBank};
use crate::models::question::Question;
use crate::models::range::{self, SequenceRange};
use crate::models::set::QuestionSet;
use std::collections::HashMap;
use tracing::{debug, info};

/// 组装题库
///
/// # 参数
/// - `sets`: 题组，顺序决定最终题号
/// - `metadata`: 题库元数据
///
/// # 返回
/// 完整题库，或可续组的 `IncompleteBank`；冲突等硬错误返回 `AssembleFailure`
pub fn assemble(
    sets: Vec<QuestionSet>,
    metadata: BankMetadata,
) -> Result<AssemblyOutcome, AssembleFailure> {
    check_ranges(&sets, metadata.total_questions)?;
    check_identifiers(&sets)?;
    check_curriculum(&sets, &metadata)?;

    let declared: Vec<SequenceRange> = sets.iter().map(QuestionSet::range).collect();
    let filled = range::coalesce(&declared);
    let missing = range::gaps(&filled, metadata.total_questions);

    if !missing.is_empty() {
        info!(
            "题库 {} 尚未收齐: 已有 {} 个题组，缺少 {}",
            metadata.topic,
            sets.len(),
            format_ranges(&missing)
        );
        return Ok(AssemblyOutcome::Incomplete(IncompleteBank {
            metadata,
            sets,
            filled,
            missing,
        }));
    }

    // 按累计位置分配全局题号
    let mut questions: Vec<Question> = Vec::with_capacity(metadata.total_questions as usize);
    for set in sets {
        for mut question in set.into_questions() {
            question.paper_metadata.sequence_in_paper = questions.len() as u32 + 1;
            questions.push(question);
        }
    }

    info!(
        "题库 {} 组装完成: 共 {} 题",
        metadata.topic,
        questions.len()
    );

    Ok(AssemblyOutcome::Complete(QuestionBank::new(
        metadata, questions,
    )))
}

impl IncompleteBank {
    /// 加入新到达的题组后重新组装
    ///
    /// 已接收的题组不再重新校验；所有题组按范围起点排序
    pub fn resume(self, more: Vec<QuestionSet>) -> Result<AssemblyOutcome, AssembleFailure> {
        let mut sets = self.sets;
        sets.extend(more);
        sets.sort_by_key(|set| set.range().start());
        assemble(sets, self.metadata)
    }
}

/// 范围必须落在 1..=total 之内，且按顺序严格递增、互不重叠
fn check_ranges(sets: &[QuestionSet], total: u32) -> Result<(), AssembleFailure> {
    let mut previous: Option<&QuestionSet> = None;

    for set in sets {
        let range = set.range();
        if range.end() > total {
            return Err(AssembleFailure::RangeOutOfBounds {
                set_name: set.name().to_string(),
                range,
                total,
            });
        }

        if let Some(prev) = previous {
            let prev_range = prev.range();
            if range.start() < prev_range.start() {
                return Err(AssembleFailure::RangeOutOfOrder {
                    set_name: set.name().to_string(),
                    range,
                    previous_set: prev.name().to_string(),
                    previous_range: prev_range,
                });
            }
            if range.start() <= prev_range.end() {
                return Err(AssembleFailure::RangeOverlap {
                    set_name: set.name().to_string(),
                    range,
                    previous_set: prev.name().to_string(),
                    previous_range: prev_range,
                });
            }
        }

        previous = Some(set);
    }

    Ok(())
}

/// questionId 在所有题组中唯一
fn check_identifiers(sets: &[QuestionSet]) -> Result<(), AssembleFailure> {
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for set in sets {
        for question in set.questions() {
            if let Some(first_set) = seen.insert(&question.question_id, set.name()) {
                return Err(AssembleFailure::IdentifierCollision {
                    question_id: question.question_id.clone(),
                    first_set: first_set.to_string(),
                    second_set: set.name().to_string(),
                });
            }
        }
    }

    debug!("questionId 唯一性检查通过: {} 个", seen.len());
    Ok(())
}

/// 课程体系必须一致；subject / strand / year 在元数据声明时必须一致
fn check_curriculum(sets: &[QuestionSet], metadata: &BankMetadata) -> Result<(), AssembleFailure> {
    for set in sets {
        for question in set.questions() {
            let curriculum = &question.curriculum;
            let mismatch = |field: &str, expected: String, found: String| {
                AssembleFailure::CurriculumMismatch {
                    question_id: question.question_id.clone(),
                    set_name: set.name().to_string(),
                    field: field.to_string(),
                    expected,
                    found,
                }
            };

            if curriculum.system != metadata.curriculum_system {
                return Err(mismatch(
                    "system",
                    metadata.curriculum_system.clone(),
                    curriculum.system.clone(),
                ));
            }
            if let Some(subject) = &metadata.subject {
                if &curriculum.subject != subject {
                    return Err(mismatch(
                        "subject",
                        subject.clone(),
                        curriculum.subject.clone(),
                    ));
                }
            }
            if let Some(strand) = &metadata.strand {
                if &curriculum.strand != strand {
                    return Err(mismatch(
                        "strand",
                        strand.clone(),
                        curriculum.strand.clone(),
                    ));
                }
            }
            if let Some(year) = metadata.year {
                if curriculum.year != year {
                    return Err(mismatch(
                        "year",
                        year.to_string(),
                        curriculum.year.to_string(),
                    ));
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn format_ranges(ranges: &[SequenceRange]) -> String {
    ranges
        .iter()
        .map(SequenceRange::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
