//! # Question Bank
//!
//! 把多个独立生成的题组整理、组装成一个完整题库，并幂等地上传到文档存储
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部文档存储，只暴露 upsert / 列出已有文档的能力
//! - `DocumentStore` - 存储抽象
//! - `JsonDirStore` / `MemoryStore` - 目录存储 / 内存存储
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，全部是纯函数或单一职责的写入器
//! - `schema_validator` - 单条记录校验
//! - `set_normalizer` - 单个题组整理
//! - `bank_assembler` - 题库组装（唯一的同步点）
//! - `upload_planner` - 上传计划
//! - `WarnWriter` / `RollbackWriter` - 写 warn.txt / 回滚文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一次上传的执行流程
//! - `SetCtx` - 上下文封装（题组索引 + 名称 + 范围）
//! - `UploadFlow` - 分批、限流执行写入操作
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 应用入口，管理存储和整体流程
//! - `orchestrator/set_processor` - 并发整理题组
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AssembleFailure, NormalizeFailure, StoreError, ValidationFailure};
pub use infrastructure::{DocumentStore, JsonDirStore, MemoryStore};
pub use models::{
    AssemblyOutcome, BankMetadata, IncompleteBank, Question, QuestionBank, QuestionSet, RawSet,
    SequenceRange, UploadPlan, UploadState,
};
pub use orchestrator::{normalize_sets, App, RunSummary};
pub use services::{assemble, normalize, plan, validate, UploadPlanner};
pub use workflow::{SetCtx, UploadFlow, UploadReport};
