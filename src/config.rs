/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 题库清单（TOML）
    pub manifest_path: String,
    /// 完整题库输出目录
    pub output_dir: String,
    /// 文档存储目录
    pub store_dir: String,
    /// 回滚文件目录
    pub rollback_dir: String,
    /// 警告文件
    pub warn_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 同时整理的题组数量
    pub max_concurrent_sets: usize,
    /// 同时进行的写入数量
    pub upload_concurrency: usize,
    /// 每批写入数量
    pub upload_batch_size: usize,
    /// 只生成计划，不写入存储
    pub dry_run: bool,
    /// 已人工确认、允许覆盖的不一致题目
    pub overwrite_ids: Vec<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_path: "bank.toml".to_string(),
            output_dir: "output".to_string(),
            store_dir: "store".to_string(),
            rollback_dir: "uploads".to_string(),
            warn_file: "warn.txt".to_string(),
            output_log_file: "output.txt".to_string(),
            max_concurrent_sets: 8,
            upload_concurrency: 16,
            upload_batch_size: 400,
            dry_run: false,
            overwrite_ids: Vec::new(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            manifest_path: std::env::var("BANK_MANIFEST").unwrap_or(default.manifest_path),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            store_dir: std::env::var("STORE_DIR").unwrap_or(default.store_dir),
            rollback_dir: std::env::var("ROLLBACK_DIR").unwrap_or(default.rollback_dir),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            max_concurrent_sets: std::env::var("MAX_CONCURRENT_SETS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_concurrent_sets),
            upload_concurrency: std::env::var("UPLOAD_CONCURRENCY").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.upload_concurrency),
            upload_batch_size: std::env::var("UPLOAD_BATCH_SIZE").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.upload_batch_size),
            dry_run: std::env::var("DRY_RUN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dry_run),
            overwrite_ids: std::env::var("OVERWRITE_IDS").map(|v| parse_id_list(&v)).unwrap_or(default.overwrite_ids),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}

/// 解析逗号分隔的 ID 列表
fn parse_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
