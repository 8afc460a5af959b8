//! 题库批处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整的"整理 → 组装 → 上传"运行。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、准备文档存储
//! 2. **加载清单**：读取 bank.toml 和其中列出的所有题组文件
//! 3. **并发整理**：交给 `set_processor` 并发整理各题组
//! 4. **组装题库**：唯一的同步点，收齐全部题组后才做冲突检查
//! 5. **质量检查**：非阻断检查，问题写入警告文件
//! 6. **规划上传**：对比存储现状，只写缺失的题目
//! 7. **执行上传**：交给 `UploadFlow`，结束后写回滚文件
//! 8. **全局统计**：汇总本次运行的结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 `DocumentStore` 的模块
//! - **可重复运行**：上传中断后重新运行即可续传
//! - **拒收不中断**：单个题组被拒收只影响本题组，题库会停在未收齐状态

use crate::config::Config;
use crate::infrastructure::{DocumentStore, JsonDirStore};
use crate::models::range::SequenceRange;
use crate::models::set::{QuestionSet, RawSet};
use crate::models::{self, AssemblyOutcome, BankManifest, IncompleteBank, QuestionBank};
use crate::orchestrator::set_processor;
use crate::services::bank_assembler::{self, format_ranges};
use crate::services::{quality_checker, RollbackWriter, UploadPlanner, WarnWriter};
use crate::utils::logging::{init_log_file, log_sets_loaded, log_startup, print_final_stats};
use crate::utils::truncate_text;
use crate::workflow::UploadFlow;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// 一次运行的结果汇总
#[derive(Debug, Default)]
pub struct RunSummary {
    /// 通过整理的题组数
    pub accepted_sets: usize,
    /// 被拒收（或无法读取）的题组名称
    pub rejected_sets: Vec<String>,
    /// 题库是否已收齐
    pub complete: bool,
    /// 尚未覆盖的题号范围
    pub missing: Vec<SequenceRange>,
    /// 完整题库输出文件
    pub bank_file: Option<PathBuf>,
    /// 本次写入成功的题目数
    pub uploaded: usize,
    /// 本次写入失败的 questionId
    pub failed: Vec<String>,
    /// 已持久化而跳过的题目数
    pub skipped: usize,
    /// 内容不一致的 questionId
    pub divergent: Vec<String>,
    /// 本次写入的回滚文件
    pub rollback_file: Option<PathBuf>,
    /// 质量检查发现的问题数（不影响上传）
    pub quality_issues: usize,
}

/// 应用主结构
pub struct App<S: DocumentStore = JsonDirStore> {
    config: Config,
    store: S,
    warn_writer: WarnWriter,
    rollback_writer: RollbackWriter,
}

impl App<JsonDirStore> {
    /// 初始化应用（使用目录存储）
    pub async fn initialize(config: Config) -> Result<Self> {
        tokio::fs::create_dir_all(&config.store_dir)
            .await
            .with_context(|| format!("无法创建存储目录: {}", config.store_dir))?;

        let store = JsonDirStore::new(&config.store_dir);
        Self::with_store(config, store)
    }
}

impl<S: DocumentStore> App<S> {
    /// 使用指定的文档存储初始化应用
    pub fn with_store(config: Config, store: S) -> Result<Self> {
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        log_startup(&config);

        let warn_writer = WarnWriter::with_path(&config.warn_file);
        let rollback_writer = RollbackWriter::new(&config.rollback_dir);

        Ok(Self {
            config,
            store,
            warn_writer,
            rollback_writer,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        let manifest = models::load_manifest(Path::new(&self.config.manifest_path)).await?;
        let mut summary = RunSummary::default();

        if manifest.sets.is_empty() {
            warn!("⚠️ 清单中没有题组，程序结束");
            return Ok(summary);
        }

        log_sets_loaded(manifest.sets.len(), self.config.max_concurrent_sets);

        // 加载与整理
        let raw_sets = self.load_sets(&manifest, &mut summary).await;
        let accepted = self.normalize_sets(raw_sets, &mut summary).await?;

        // 组装
        let outcome = bank_assembler::assemble(accepted, manifest.metadata.clone())
            .map_err(|failure| {
                error!("❌ 题库组装失败: {}", failure);
                failure
            })?;

        let bank = match outcome {
            AssemblyOutcome::Incomplete(incomplete) => {
                log_incomplete(&incomplete);
                summary.missing = incomplete.missing().to_vec();
                return Ok(summary);
            }
            AssemblyOutcome::Complete(bank) => bank,
        };

        summary.complete = true;
        let bank_file = models::write_bank_file(&bank, Path::new(&self.config.output_dir)).await?;
        info!("💾 完整题库已保存: {}", bank_file.display());
        for (set_id, count) in bank.set_distribution() {
            debug!("  {}: {} 题", set_id, count);
        }
        summary.bank_file = Some(bank_file);

        summary.quality_issues = self.check_quality(&bank).await;

        // 规划与上传
        self.upload_bank(&bank, &mut summary).await?;

        print_final_stats(
            summary.uploaded,
            summary.failed.len(),
            summary.skipped,
            summary.divergent.len(),
            &self.config.output_log_file,
        );

        Ok(summary)
    }

    /// 加载清单中的所有题组文件
    ///
    /// 无法读取的题组记为拒收，不影响其他题组
    async fn load_sets(&self, manifest: &BankManifest, summary: &mut RunSummary) -> Vec<RawSet> {
        info!("\n📁 正在加载题组文件...");
        let mut raw_sets = Vec::with_capacity(manifest.sets.len());

        for entry in &manifest.sets {
            match models::load_raw_set(manifest, entry).await {
                Ok(raw) => raw_sets.push(raw),
                Err(e) => {
                    error!("[{}] ❌ 无法加载题组文件: {:#}", entry.name, e);
                    if let Err(we) = self
                        .warn_writer
                        .write_unloadable_set(&entry.name, &format!("{:#}", e))
                        .await
                    {
                        warn!("写入警告文件失败: {}", we);
                    }
                    summary.rejected_sets.push(entry.name.clone());
                }
            }
        }

        raw_sets
    }

    /// 并发整理题组，拒收的题组写入警告文件
    async fn normalize_sets(
        &self,
        raw_sets: Vec<RawSet>,
        summary: &mut RunSummary,
    ) -> Result<Vec<QuestionSet>> {
        let results =
            set_processor::normalize_sets(raw_sets, self.config.max_concurrent_sets).await?;
        let mut accepted = Vec::with_capacity(results.len());

        for result in results {
            match result {
                Ok(set) => accepted.push(set),
                Err(failure) => {
                    if let Err(e) = self.warn_writer.write_rejected_set(&failure).await {
                        warn!("写入警告文件失败: {}", e);
                    }
                    summary.rejected_sets.push(failure.set_name().to_string());
                }
            }
        }

        summary.accepted_sets = accepted.len();
        Ok(accepted)
    }

    /// 质量检查：只记录问题，不阻断上传
    async fn check_quality(&self, bank: &QuestionBank) -> usize {
        let report = quality_checker::check_bank(bank.questions());

        for (question_type, count) in &report.type_distribution {
            debug!("  题型 {}: {} 题", question_type, count);
        }
        for (difficulty, count) in &report.difficulty_distribution {
            debug!("  难度 {}: {} 题", difficulty, count);
        }

        if report.issues.is_empty() {
            info!("✓ 质量检查通过");
            return 0;
        }

        warn!(
            "⚠️ 质量检查: {} 个错误, {} 个警告（不影响上传）",
            report.error_count(),
            report.warning_count()
        );
        for issue in &report.issues {
            warn!("  {}", issue);
            if let Err(e) = self.warn_writer.write_quality_issue(issue).await {
                warn!("写入警告文件失败: {}", e);
            }
        }

        report.issues.len()
    }

    /// 规划并执行上传
    async fn upload_bank(&self, bank: &QuestionBank, summary: &mut RunSummary) -> Result<()> {
        let prior = self
            .store
            .persisted()
            .await
            .context("无法读取存储中已有的文档")?;

        let plan = UploadPlanner::new()
            .with_overwrite(self.config.overwrite_ids.iter())
            .plan(bank, &prior);

        info!(
            "📋 上传计划: 待写入 {} | 已存在 {} | 不一致 {}",
            plan.operations.len(),
            plan.already_persisted,
            plan.divergences.len()
        );

        summary.skipped = plan.already_persisted;
        for divergence in &plan.divergences {
            warn!(
                "⚠️ {} | 题干: {}",
                divergence,
                truncate_text(&divergence.local.stem, 40)
            );
            if let Err(e) = self.warn_writer.write_divergence(divergence).await {
                warn!("写入警告文件失败: {}", e);
            }
            summary.divergent.push(divergence.question_id.clone());
        }

        if self.config.dry_run {
            info!("🧪 演练模式: 跳过 {} 个写入", plan.operations.len());
            return Ok(());
        }

        if plan.is_empty() {
            info!("✓ 存储已是最新，无需写入");
            return Ok(());
        }

        let report = UploadFlow::new(&self.config)
            .run(&self.store, &plan.operations)
            .await;

        if !report.is_success() {
            warn!(
                "⚠️ {} 个写入失败，重新运行即可续传",
                report.failed.len()
            );
        }

        summary.uploaded = report.written.len();
        summary.failed = report.failed.into_iter().map(|(id, _)| id).collect();

        if !report.written.is_empty() {
            let slug = bank.metadata().slug();
            let rollback_file = self.rollback_writer.write(&slug, &report.written).await?;
            info!("↩️ 回滚文件已保存: {}", rollback_file.display());
            summary.rollback_file = Some(rollback_file);
        }

        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn log_incomplete(incomplete: &IncompleteBank) {
    info!("\n{}", "=".repeat(60));
    info!("⏸️ 题库尚未收齐: {}", incomplete.metadata().topic);
    info!(
        "✓ 已覆盖: {} ({} 题)",
        format_ranges(incomplete.filled()),
        incomplete.question_count()
    );
    info!(
        "⏳ 缺少: {} ({} 题)",
        format_ranges(incomplete.missing()),
        incomplete.missing_count()
    );
    info!("{}", "=".repeat(60));
}
