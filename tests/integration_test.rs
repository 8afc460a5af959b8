use question_bank::config::Config;
use question_bank::error::StoreError;
use question_bank::infrastructure::{DocumentStore, JsonDirStore, MemoryStore};
use question_bank::logger;
use question_bank::models::{SequenceRange, UploadState};
use question_bank::App;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio_test::{assert_err, assert_ok};

// ========== 测试数据 ==========

fn record(id: &str, sequence: u32) -> Value {
    json!({
        "questionId": id,
        "questionType": "MCQ",
        "stem": format!("Question {}: which form of energy is stored in a stretched spring?", sequence),
        "options": ["Kinetic", "Elastic potential", "Thermal", "Sound"],
        "correctAnswer": 1,
        "solution": "A stretched spring stores elastic potential energy because its coils are pulled out of shape.",
        "difficulty": 2,
        "estimatedTime": 60,
        "curriculum": {
            "system": "Australian Curriculum v9",
            "codes": ["AC9S8U05"],
            "year": 8,
            "subject": "Science",
            "strand": "Physical Sciences"
        },
        "hints": [
            { "level": 1, "content": "Think about shape change.", "revealsCriticalInfo": false },
            { "level": 2, "content": "The spring can do work when released.", "revealsCriticalInfo": true }
        ],
        "paperMetadata": { "setId": "year8-energy", "sequenceInPaper": sequence },
        "status": "published"
    })
}

fn question_id(sequence: u32) -> String {
    format!("eft-y8-{:03}", sequence)
}

fn set_records(start: u32, end: u32) -> Vec<Value> {
    (start..=end).map(|n| record(&question_id(n), n)).collect()
}

fn write_set(dir: &Path, name: &str, records: &[Value]) {
    let content = serde_json::to_string_pretty(records).unwrap();
    std::fs::write(dir.join(format!("{}.json", name)), content).unwrap();
}

/// 写入清单，题组文件名与题组名相同
fn write_manifest(dir: &Path, sets: &[(&str, &str)]) {
    let mut content = String::from(
        r#"
[metadata]
topic = "Energy Forms and Transformations"
curriculum_system = "Australian Curriculum v9"
total_questions = 30
year = 8
"#,
    );
    for (name, range) in sets {
        content.push_str(&format!(
            "\n[[sets]]\nname = \"{}\"\npath = \"{}.json\"\nrange = \"{}\"\n",
            name, name, range
        ));
    }
    std::fs::write(dir.join("bank.toml"), content).unwrap();
}

/// 标准的三个题组：Q1-Q10 / Q11-Q20 / Q21-Q30
fn write_full_bank(dir: &Path) {
    write_set(dir, "set1", &set_records(1, 10));
    write_set(dir, "set2", &set_records(11, 20));
    write_set(dir, "set3", &set_records(21, 30));
    write_manifest(
        dir,
        &[("set1", "Q1-Q10"), ("set2", "Q11-Q20"), ("set3", "Q21-Q30")],
    );
}

fn config_for(dir: &Path) -> Config {
    let path = |name: &str| dir.join(name).to_string_lossy().to_string();
    Config {
        manifest_path: path("bank.toml"),
        output_dir: path("output"),
        store_dir: path("store"),
        rollback_dir: path("uploads"),
        warn_file: path("warn.txt"),
        output_log_file: path("output.txt"),
        max_concurrent_sets: 2,
        upload_concurrency: 4,
        upload_batch_size: 8,
        ..Config::default()
    }
}

fn setup() -> TempDir {
    logger::init(false);
    tempfile::tempdir().unwrap()
}

/// 拒绝写入指定键的存储
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    reject: Mutex<HashSet<String>>,
}

impl DocumentStore for FlakyStore {
    async fn upsert(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        if self.reject.lock().await.contains(key) {
            return Err(StoreError::Rejected {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.inner.upsert(key, document).await
    }

    async fn persisted(&self) -> Result<UploadState, StoreError> {
        self.inner.persisted().await
    }
}

// ========== 完整流程 ==========

#[tokio::test]
async fn test_complete_bank_is_written_and_uploaded() {
    let dir = setup();
    write_full_bank(dir.path());

    let app = assert_ok!(App::with_store(config_for(dir.path()), MemoryStore::new()));
    let summary = assert_ok!(app.run().await);

    assert!(summary.complete);
    assert_eq!(summary.accepted_sets, 3);
    assert!(summary.rejected_sets.is_empty());
    assert_eq!(summary.uploaded, 30);
    assert!(summary.failed.is_empty());
    assert_eq!(app.store().len().await, 30);

    // 题库文件：按全局题号排列
    let bank_file = summary.bank_file.expect("应生成题库文件");
    assert!(bank_file.ends_with("energy-forms-and-transformations-complete.json"));
    let bank: Value = serde_json::from_str(&std::fs::read_to_string(&bank_file).unwrap()).unwrap();
    let questions = bank["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 30);
    for (idx, question) in questions.iter().enumerate() {
        assert_eq!(question["questionId"], json!(question_id(idx as u32 + 1)));
        assert_eq!(
            question["paperMetadata"]["sequenceInPaper"],
            json!(idx as u32 + 1)
        );
    }
    assert_eq!(bank["metadata"]["totalQuestions"], json!(30));

    // 回滚文件：记录本次写入的全部 ID
    let rollback_file = summary.rollback_file.expect("应生成回滚文件");
    let ids: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(rollback_file).unwrap()).unwrap();
    assert_eq!(ids.len(), 30);
    assert!(ids.contains(&question_id(17)));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let dir = setup();
    write_full_bank(dir.path());

    let app = assert_ok!(App::with_store(config_for(dir.path()), MemoryStore::new()));
    let first = assert_ok!(app.run().await);
    assert_eq!(first.uploaded, 30);

    let second = assert_ok!(app.run().await);
    assert!(second.complete);
    assert_eq!(second.uploaded, 0);
    assert_eq!(second.skipped, 30);
    assert!(second.divergent.is_empty());
    assert!(second.rollback_file.is_none());
    assert_eq!(app.store().len().await, 30);
}

#[tokio::test]
async fn test_directory_store_end_to_end() {
    let dir = setup();
    write_full_bank(dir.path());
    let config = config_for(dir.path());
    let store_dir = config.store_dir.clone();

    let app = assert_ok!(App::initialize(config).await);
    let summary = assert_ok!(app.run().await);
    assert_eq!(summary.uploaded, 30);

    let state = assert_ok!(JsonDirStore::new(&store_dir).persisted().await);
    assert_eq!(state.len(), 30);
    assert!(state.contains(&question_id(30)));
}

// ========== 未收齐 / 拒收 ==========

#[tokio::test]
async fn test_incomplete_bank_stops_before_upload() {
    let dir = setup();
    write_set(dir.path(), "set1", &set_records(1, 10));
    write_set(dir.path(), "set3", &set_records(21, 30));
    write_manifest(dir.path(), &[("set1", "Q1-Q10"), ("set3", "Q21-Q30")]);

    let app = assert_ok!(App::with_store(config_for(dir.path()), MemoryStore::new()));
    let summary = assert_ok!(app.run().await);

    assert!(!summary.complete);
    assert_eq!(summary.accepted_sets, 2);
    assert_eq!(summary.missing, vec![SequenceRange::new(11, 20).unwrap()]);
    assert!(summary.bank_file.is_none());
    assert!(app.store().is_empty().await);
}

#[tokio::test]
async fn test_rejected_set_leaves_bank_incomplete() {
    let dir = setup();
    let mut set2 = set_records(11, 20);
    set2.remove(4); // 缺少 Q15
    write_set(dir.path(), "set1", &set_records(1, 10));
    write_set(dir.path(), "set2", &set2);
    write_set(dir.path(), "set3", &set_records(21, 30));
    write_manifest(
        dir.path(),
        &[("set1", "Q1-Q10"), ("set2", "Q11-Q20"), ("set3", "Q21-Q30")],
    );

    let config = config_for(dir.path());
    let warn_file = config.warn_file.clone();
    let app = assert_ok!(App::with_store(config, MemoryStore::new()));
    let summary = assert_ok!(app.run().await);

    assert_eq!(summary.rejected_sets, vec!["set2".to_string()]);
    assert!(!summary.complete);
    assert_eq!(summary.missing, vec![SequenceRange::new(11, 20).unwrap()]);
    assert!(app.store().is_empty().await);

    let warnings = std::fs::read_to_string(warn_file).unwrap();
    assert!(warnings.contains("题组拒收 | set2"));
}

#[tokio::test]
async fn test_missing_set_file_is_rejected() {
    let dir = setup();
    write_set(dir.path(), "set1", &set_records(1, 10));
    write_set(dir.path(), "set3", &set_records(21, 30));
    write_manifest(
        dir.path(),
        &[("set1", "Q1-Q10"), ("set2", "Q11-Q20"), ("set3", "Q21-Q30")],
    );

    let app = assert_ok!(App::with_store(config_for(dir.path()), MemoryStore::new()));
    let summary = assert_ok!(app.run().await);

    assert_eq!(summary.rejected_sets, vec!["set2".to_string()]);
    assert_eq!(summary.accepted_sets, 2);
    assert!(!summary.complete);
}

#[tokio::test]
async fn test_identifier_collision_aborts_run() {
    let dir = setup();
    let mut set2 = set_records(11, 20);
    set2[0]["questionId"] = json!(question_id(1));
    write_set(dir.path(), "set1", &set_records(1, 10));
    write_set(dir.path(), "set2", &set2);
    write_set(dir.path(), "set3", &set_records(21, 30));
    write_manifest(
        dir.path(),
        &[("set1", "Q1-Q10"), ("set2", "Q11-Q20"), ("set3", "Q21-Q30")],
    );

    let app = assert_ok!(App::with_store(config_for(dir.path()), MemoryStore::new()));
    let err = assert_err!(app.run().await);

    assert!(err.to_string().contains(&question_id(1)));
    assert!(app.store().is_empty().await);
}

// ========== 上传 ==========

#[tokio::test]
async fn test_failed_writes_resume_on_next_run() {
    let dir = setup();
    write_full_bank(dir.path());

    let store = FlakyStore::default();
    store.reject.lock().await.insert(question_id(15));

    let app = assert_ok!(App::with_store(config_for(dir.path()), store));
    let first = assert_ok!(app.run().await);
    assert_eq!(first.uploaded, 29);
    assert_eq!(first.failed, vec![question_id(15)]);

    app.store().reject.lock().await.clear();

    let second = assert_ok!(app.run().await);
    assert_eq!(second.uploaded, 1);
    assert_eq!(second.skipped, 29);
    assert!(second.failed.is_empty());
    assert_eq!(app.store().inner.len().await, 30);
}

#[tokio::test]
async fn test_divergent_document_is_not_overwritten() {
    let dir = setup();
    write_full_bank(dir.path());

    let stale = json!({ "questionId": question_id(5), "stem": "an older draft" });
    let store = MemoryStore::new();
    assert_ok!(store.upsert(&question_id(5), &stale).await);

    let config = config_for(dir.path());
    let warn_file = config.warn_file.clone();
    let app = assert_ok!(App::with_store(config, store));
    let summary = assert_ok!(app.run().await);

    assert_eq!(summary.divergent, vec![question_id(5)]);
    assert_eq!(summary.uploaded, 29);
    assert_eq!(app.store().get(&question_id(5)).await, Some(stale));

    let warnings = std::fs::read_to_string(warn_file).unwrap();
    assert!(warnings.contains(&format!("内容不一致 | {}", question_id(5))));
}

#[tokio::test]
async fn test_unreadable_stored_document_is_reported() {
    let dir = setup();
    write_full_bank(dir.path());

    let config = config_for(dir.path());
    let store_dir = Path::new(&config.store_dir).to_path_buf();
    std::fs::create_dir_all(&store_dir).unwrap();
    std::fs::write(
        store_dir.join(format!("{}.json", question_id(7))),
        b"{ truncated",
    )
    .unwrap();
    let warn_file = config.warn_file.clone();

    let app = assert_ok!(App::initialize(config).await);
    let summary = assert_ok!(app.run().await);

    assert_eq!(summary.divergent, vec![question_id(7)]);
    assert_eq!(summary.uploaded, 29);
    assert_eq!(summary.skipped, 0);

    let warnings = std::fs::read_to_string(warn_file).unwrap();
    assert!(warnings.contains(&format!("内容不一致 | {}", question_id(7))));
    assert!(warnings.contains("无法读取"));
}

#[tokio::test]
async fn test_confirmed_overwrite_replaces_divergent_document() {
    let dir = setup();
    write_full_bank(dir.path());

    let store = MemoryStore::new();
    let stale = json!({ "questionId": question_id(5), "stem": "an older draft" });
    assert_ok!(store.upsert(&question_id(5), &stale).await);

    let config = Config {
        overwrite_ids: vec![question_id(5)],
        ..config_for(dir.path())
    };
    let app = assert_ok!(App::with_store(config, store));
    let summary = assert_ok!(app.run().await);

    assert!(summary.divergent.is_empty());
    assert_eq!(summary.uploaded, 30);
    let stored = app.store().get(&question_id(5)).await.unwrap();
    assert_eq!(stored["paperMetadata"]["sequenceInPaper"], json!(5));
}

#[tokio::test]
async fn test_dry_run_does_not_write() {
    let dir = setup();
    write_full_bank(dir.path());

    let config = Config {
        dry_run: true,
        ..config_for(dir.path())
    };
    let app = assert_ok!(App::with_store(config, MemoryStore::new()));
    let summary = assert_ok!(app.run().await);

    assert!(summary.complete);
    assert!(summary.bank_file.is_some());
    assert_eq!(summary.uploaded, 0);
    assert!(summary.rollback_file.is_none());
    assert!(app.store().is_empty().await);
}

// ========== 质量检查 ==========

#[tokio::test]
async fn test_quality_issues_do_not_block_upload() {
    let dir = setup();
    write_full_bank(dir.path());

    let mut records = set_records(11, 20);
    records[4]["stem"] = json!("How much energy is stored when $E = \\frac{1}{2}kx^2 for a spring?");
    write_set(dir.path(), "set2", &records);

    let config = config_for(dir.path());
    let warn_file = config.warn_file.clone();
    let app = assert_ok!(App::with_store(config, MemoryStore::new()));
    let summary = assert_ok!(app.run().await);

    assert!(summary.complete);
    assert_eq!(summary.quality_issues, 1);
    assert_eq!(summary.uploaded, 30);

    let warnings = std::fs::read_to_string(warn_file).unwrap();
    let lines: Vec<&str> = warnings.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("质量检查"));
    assert!(lines[0].contains(&question_id(15)));
    assert!(lines[0].contains("$ 未配对"));
}

#[tokio::test]
async fn test_clean_bank_has_no_quality_issues() {
    let dir = setup();
    write_full_bank(dir.path());

    let config = config_for(dir.path());
    let warn_file = config.warn_file.clone();
    let app = assert_ok!(App::with_store(config, MemoryStore::new()));
    let summary = assert_ok!(app.run().await);

    assert_eq!(summary.quality_issues, 0);
    assert!(!Path::new(&warn_file).exists());
}
