//! 上传计划服务 - 业务能力层
//!
//! 对比题库与存储中已持久化的题目，只为尚未持久化的题目生成 upsert 操作。
//! 中途失败后重新规划即可续传，本服务不做重试。
//!
//! 存储中已有但内容不同的题目作为 `UploadDivergence` 上报，
//! 除非调用方通过 `with_overwrite` 显式确认，否则不会覆盖。

use crate::models::bank::QuestionBank;
use crate::models::question::Question;
use crate::models::upload::{
    StoredDocument, UploadDivergence, UploadPlan, UploadState, WriteOperation,
};
use serde_json::Value;
use std::collections::HashSet;

/// 上传计划器
#[derive(Debug, Clone, Default)]
pub struct UploadPlanner {
    /// 已确认可以覆盖的题目
    overwrite: HashSet<String>,
}

impl UploadPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 显式确认覆盖这些题目的存储版本
    pub fn with_overwrite<I, S>(mut self, question_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overwrite
            .extend(question_ids.into_iter().map(Into::into));
        self
    }

    /// 生成上传计划
    ///
    /// 操作按题库顺序排列，但彼此无依赖，可任意顺序执行
    pub fn plan(&self, bank: &QuestionBank, prior: &UploadState) -> UploadPlan {
        let mut plan = UploadPlan::default();

        for question in bank.questions() {
            let id = question.question_id.as_str();

            let stored = match prior.get(id) {
                None => {
                    plan.operations.push(write(question));
                    continue;
                }
                // 只知道已持久化
                Some(StoredDocument::Unknown) => {
                    plan.already_persisted += 1;
                    continue;
                }
                Some(StoredDocument::Content(value)) if same_content(value, question) => {
                    plan.already_persisted += 1;
                    continue;
                }
                Some(StoredDocument::Content(value)) => Some(value.clone()),
                Some(StoredDocument::Unreadable(_)) => None,
            };

            if self.overwrite.contains(id) {
                plan.operations.push(write(question));
            } else {
                plan.divergences.push(UploadDivergence {
                    question_id: id.to_string(),
                    stored,
                    local: question.clone(),
                });
            }
        }

        plan
    }
}

/// 使用默认规则（不覆盖任何不一致的题目）生成计划
pub fn plan(bank: &QuestionBank, prior: &UploadState) -> UploadPlan {
    UploadPlanner::new().plan(bank, prior)
}

fn write(question: &Question) -> WriteOperation {
    WriteOperation {
        question_id: question.question_id.clone(),
        question: question.clone(),
    }
}

/// 存储内容无法解析为题目时视为不一致
fn same_content(stored: &Value, question: &Question) -> bool {
    serde_json::from_value::<Question>(stored.clone())
        .map(|stored| &stored == question)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bank::BankMetadata;
    use crate::models::range::SequenceRange;
    use crate::services::bank_assembler::assemble;
    use crate::services::schema_validator::tests::mcq_record;
    use crate::services::set_normalizer::normalize;
    use serde_json::json;

    fn bank(total: u32) -> QuestionBank {
        let records: Vec<_> = (1..=total)
            .map(|n| mcq_record(&format!("eft-{:03}", n), n))
            .collect();
        let set = normalize("set1", &records, SequenceRange::new(1, total).unwrap()).unwrap();
        assemble(
            vec![set],
            BankMetadata::new("Energy", "Australian Curriculum v9", total),
        )
        .unwrap()
        .into_complete()
        .unwrap()
    }

    fn ids(plan: &UploadPlan) -> Vec<&str> {
        plan.operations
            .iter()
            .map(|op| op.question_id.as_str())
            .collect()
    }

    #[test]
    fn test_empty_state_uploads_everything() {
        let bank = bank(5);
        let plan = plan(&bank, &UploadState::new());
        assert_eq!(plan.operations.len(), 5);
        assert!(plan.divergences.is_empty());
        assert_eq!(plan.already_persisted, 0);
    }

    #[test]
    fn test_fully_persisted_bank_needs_no_operations() {
        let bank = bank(5);

        let by_id = UploadState::from_ids(bank.question_ids());
        assert!(plan(&bank, &by_id).is_empty());

        let mut by_content = UploadState::new();
        for question in bank.questions() {
            by_content.insert(
                question.question_id.clone(),
                Some(serde_json::to_value(question).unwrap()),
            );
        }
        let plan = plan(&bank, &by_content);
        assert!(plan.is_empty());
        assert_eq!(plan.already_persisted, 5);
    }

    #[test]
    fn test_replan_after_partial_upload() {
        let bank = bank(6);
        let first = plan(&bank, &UploadState::new());

        // 任意顺序执行了其中一部分
        let done = ["eft-005", "eft-002", "eft-006"];
        let state = UploadState::from_ids(done);
        let second = plan(&bank, &state);

        assert_eq!(ids(&second), vec!["eft-001", "eft-003", "eft-004"]);
        assert_eq!(second.operations.len() + done.len(), first.operations.len());
    }

    #[test]
    fn test_divergence_is_reported_not_overwritten() {
        let bank = bank(3);
        let mut stored = serde_json::to_value(&bank.questions()[1]).unwrap();
        stored["stem"] = json!("An older wording of the question");

        let mut state = UploadState::new();
        state.insert("eft-002", Some(stored));

        let plan = plan(&bank, &state);
        assert_eq!(ids(&plan), vec!["eft-001", "eft-003"]);
        assert_eq!(plan.divergences.len(), 1);
        assert_eq!(plan.divergences[0].question_id, "eft-002");

        let plan = UploadPlanner::new()
            .with_overwrite(["eft-002"])
            .plan(&bank, &state);
        assert_eq!(ids(&plan), vec!["eft-001", "eft-002", "eft-003"]);
        assert!(plan.divergences.is_empty());
    }

    #[test]
    fn test_unreadable_stored_document_diverges() {
        let bank = bank(1);
        let mut state = UploadState::new();
        state.insert("eft-001", Some(json!({ "questionId": "eft-001" })));

        let plan = plan(&bank, &state);
        assert!(plan.operations.is_empty());
        assert_eq!(plan.divergences.len(), 1);
    }

    #[test]
    fn test_unreadable_file_diverges_but_unknown_content_is_persisted() {
        let bank = bank(3);
        let mut state = UploadState::from_ids(["eft-001"]);
        state.insert_unreadable("eft-002", "expected value at line 1 column 3");

        let plan = plan(&bank, &state);
        assert_eq!(ids(&plan), vec!["eft-003"]);
        assert_eq!(plan.already_persisted, 1);
        assert_eq!(plan.divergences.len(), 1);
        assert_eq!(plan.divergences[0].question_id, "eft-002");
        assert_eq!(plan.divergences[0].stored, None);
        assert!(plan.divergences[0].to_string().contains("无法读取"));

        let plan = UploadPlanner::new()
            .with_overwrite(["eft-002"])
            .plan(&bank, &state);
        assert_eq!(ids(&plan), vec!["eft-002", "eft-003"]);
        assert!(plan.divergences.is_empty());
    }
}
