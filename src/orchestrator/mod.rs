//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 题库批处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载清单和所有题组文件
//! - 组装题库、规划并执行上传
//! - 持有文档存储（DocumentStore）
//! - 输出全局统计信息
//!
//! ### `set_processor` - 题组处理器
//! - 并发整理多个题组（Semaphore 限流）
//! - 输出单个题组的处理日志
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理整个题库)
//!     ↓
//! set_processor (处理 Vec<RawSet>)
//!     ↓
//! workflow::UploadFlow (执行写入操作)
//!     ↓
//! services (能力层：validate / normalize / assemble / plan / warn / rollback)
//!     ↓
//! infrastructure (基础设施：DocumentStore)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管整体，set_processor 管题组
//! 2. **资源隔离**：只有编排层持有 DocumentStore
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;
pub mod set_processor;

// 重新导出主要类型
pub use batch_processor::{App, RunSummary};
pub use set_processor::{normalize_sets, process_set};
