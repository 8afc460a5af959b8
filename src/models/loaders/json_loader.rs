use crate::models::bank::QuestionBank;
use crate::models::manifest::{BankManifest, SetEntry};
use crate::models::set::RawSet;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取一个题组文件中的原始记录
///
/// 生产方的输出有两种形态：记录数组，或带 `questions` 数组的对象
pub async fn load_raw_records(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取题组文件: {}", path.display()))?;

    let data: Value = serde_json::from_str(&content)
        .with_context(|| format!("无法解析题组文件: {}", path.display()))?;

    extract_records(data).with_context(|| format!("题组文件格式不正确: {}", path.display()))
}

fn extract_records(data: Value) -> Result<Vec<Value>> {
    match data {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(records)) => Ok(records),
            _ => anyhow::bail!("缺少 questions 数组"),
        },
        _ => anyhow::bail!("顶层必须是数组或对象"),
    }
}

/// 解析题组文件路径（相对路径基于清单目录）
pub fn resolve_set_path(manifest: &BankManifest, entry: &SetEntry) -> PathBuf {
    let path = Path::new(&entry.path);
    match &manifest.base_dir {
        Some(base) if path.is_relative() => Path::new(base).join(path),
        _ => path.to_path_buf(),
    }
}

/// 按清单条目加载原始题组
pub async fn load_raw_set(manifest: &BankManifest, entry: &SetEntry) -> Result<RawSet> {
    let path = resolve_set_path(manifest, entry);
    let records = load_raw_records(&path).await?;
    tracing::info!(
        "正在加载: {} ({}) - {} 条记录",
        entry.name,
        entry.range,
        records.len()
    );
    Ok(RawSet::new(entry.name.clone(), entry.range, records))
}

/// 写出完整题库：`<output_dir>/<slug>-complete.json`
pub async fn write_bank_file(bank: &QuestionBank, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;

    let path = output_dir.join(format!("{}-complete.json", bank.metadata().slug()));
    let content = serde_json::to_string_pretty(bank)?;
    fs::write(&path, content)
        .await
        .with_context(|| format!("无法写入题库文件: {}", path.display()))?;

    Ok(path)
}
