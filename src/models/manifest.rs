use crate::models::bank::BankMetadata;
use crate::models::range::SequenceRange;
use serde::{Deserialize, Serialize};

/// 题库清单（bank.toml）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankManifest {
    pub metadata: BankMetadata,
    /// 题组按此顺序组装
    #[serde(default)]
    pub sets: Vec<SetEntry>,
    /// 清单文件所在目录，题组路径相对于它解析
    #[serde(skip_serializing, skip_deserializing)]
    pub base_dir: Option<String>,
}

/// 清单中的一个题组
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetEntry {
    pub name: String,
    /// 原始记录文件（JSON）
    pub path: String,
    pub range: SequenceRange,
}
