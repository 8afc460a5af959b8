//! 基础设施层
//!
//! 持有唯一的共享资源（外部文档存储），只暴露 upsert / 列出已持久化文档的能力

pub mod json_dir_store;
pub mod memory_store;
pub mod store;

pub use json_dir_store::JsonDirStore;
pub use memory_store::MemoryStore;
pub use store::DocumentStore;
