use crate::models::manifest::BankManifest;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载题库清单
pub async fn load_manifest(manifest_path: &Path) -> Result<BankManifest> {
    let content = fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("无法读取清单文件: {}", manifest_path.display()))?;

    let mut manifest = parse_manifest(&content)
        .with_context(|| format!("无法解析清单文件: {}", manifest_path.display()))?;

    // 记录清单所在目录
    manifest.base_dir = manifest_path
        .parent()
        .map(|dir| dir.to_string_lossy().to_string());

    tracing::info!(
        "已加载清单: {} ({} 个题组, 共 {} 题)",
        manifest.metadata.topic,
        manifest.sets.len(),
        manifest.metadata.total_questions
    );

    Ok(manifest)
}

/// 解析清单文本
pub fn parse_manifest(content: &str) -> Result<BankManifest> {
    let manifest: BankManifest = toml::from_str(content)?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest = parse_manifest(
            r#"
            [metadata]
            topic = "Energy Forms and Transformations"
            topic_slug = "energy-forms-transformations"
            curriculum_system = "Australian Curriculum v9"
            total_questions = 20
            year = 8

            [[sets]]
            name = "set1"
            path = "sets/set1.json"
            range = "Q1-Q10"

            [[sets]]
            name = "set2"
            path = "sets/set2.json"
            range = "Q11–Q20"
            "#,
        )
        .unwrap();

        assert_eq!(manifest.metadata.total_questions, 20);
        assert_eq!(manifest.metadata.year, Some(8));
        assert_eq!(manifest.metadata.slug(), "energy-forms-transformations");
        assert_eq!(manifest.sets.len(), 2);
        assert_eq!(manifest.sets[1].range.start(), 11);
        assert_eq!(manifest.sets[1].range.end(), 20);
    }

    #[test]
    fn test_parse_manifest_rejects_bad_range() {
        let result = parse_manifest(
            r#"
            [metadata]
            topic = "Cells"
            curriculum_system = "AC v9"
            total_questions = 10

            [[sets]]
            name = "set1"
            path = "set1.json"
            range = "Q10-Q1"
            "#,
        );
        assert!(result.is_err());
    }
}
