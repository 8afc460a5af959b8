use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::info;

use crate::config::Config;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n题库组装日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题库组装与上传");
    info!("📄 清单: {}", config.manifest_path);
    info!("📊 题组并发数: {}", config.max_concurrent_sets);
    if config.dry_run {
        info!("🧪 演练模式: 只生成上传计划，不写入存储");
    }
    info!("{}", "=".repeat(60));
}

/// 记录题组加载信息
///
/// # 参数
/// - `total`: 题组总数
/// - `max_concurrent`: 最大并发数
pub fn log_sets_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待整理的题组", total);
    info!("📋 最多同时整理 {} 个题组\n", max_concurrent);
}

/// 记录上传批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `start`: 起始操作编号
/// - `end`: 结束操作编号
/// - `total`: 操作总数
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始上传第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批写入: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录上传批次完成信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `success`: 成功数量
/// - `total`: 本批数量
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `uploaded`: 写入成功数量
/// - `failed`: 写入失败数量
/// - `skipped`: 已持久化而跳过的数量
/// - `divergent`: 内容不一致的数量
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    uploaded: usize,
    failed: usize,
    skipped: usize,
    divergent: usize,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 写入成功: {}", uploaded);
    info!("⏭️ 已存在跳过: {}", skipped);
    info!("❌ 写入失败: {}", failed);
    info!("⚠️ 内容不一致: {}", divergent);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("能量转换", 10), "能量转换");
        assert_eq!(truncate_text("能量转换与守恒", 4), "能量转换...");
    }
}
