//! 题组处理上下文
//!
//! 封装"我正在处理清单里的第几个题组"这一信息

use crate::models::range::SequenceRange;
use std::fmt::Display;

/// 题组处理上下文
#[derive(Debug, Clone)]
pub struct SetCtx {
    /// 题组在清单中的索引（从1开始，仅用于日志显示）
    pub set_index: usize,

    /// 题组名称
    pub set_name: String,

    /// 声明的题号范围
    pub range: SequenceRange,
}

impl SetCtx {
    /// 创建新的题组上下文
    pub fn new(set_index: usize, set_name: String, range: SequenceRange) -> Self {
        Self {
            set_index,
            set_name,
            range,
        }
    }
}

impl Display for SetCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[题组 #{} {} {}]",
            self.set_index, self.set_name, self.range
        )
    }
}
