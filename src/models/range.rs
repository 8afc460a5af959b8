use crate::error::RangeParseError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// 题号范围（闭区间，从 1 开始）
///
/// 清单中写作 `Q11-Q20`，也接受 `Q11–Q20`、`11-20` 和单题 `Q7`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SequenceRange {
    start: u32,
    end: u32,
}

impl SequenceRange {
    pub fn new(start: u32, end: u32) -> Result<Self, RangeParseError> {
        if start == 0 {
            return Err(RangeParseError::new(
                format!("{}-{}", start, end),
                "题号从 1 开始",
            ));
        }
        if start > end {
            return Err(RangeParseError::new(
                format!("{}-{}", start, end),
                "起始题号大于结束题号",
            ));
        }
        Ok(Self { start, end })
    }

    /// 解析范围标签
    pub fn parse(label: &str) -> Result<Self, RangeParseError> {
        let re = Regex::new(r"^\s*[Qq]?(\d+)\s*(?:[-–—]\s*[Qq]?(\d+))?\s*$")
            .map_err(|e| RangeParseError::new(label, e.to_string()))?;

        let caps = re
            .captures(label)
            .ok_or_else(|| RangeParseError::new(label, "格式应为 Q<起>-Q<止>"))?;

        let parse_num = |s: &str| {
            s.parse::<u32>()
                .map_err(|e| RangeParseError::new(label, e.to_string()))
        };

        let start = parse_num(&caps[1])?;
        let end = match caps.get(2) {
            Some(m) => parse_num(m.as_str())?,
            None => start,
        };

        Self::new(start, end).map_err(|e| RangeParseError::new(label, e.reason))
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// 范围内的题目数量
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    /// 闭区间不会为空
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, position: u32) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn positions(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for SequenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "Q{}", self.start)
        } else {
            write!(f, "Q{}-Q{}", self.start, self.end)
        }
    }
}

impl FromStr for SequenceRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SequenceRange {
    type Error = RangeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SequenceRange> for String {
    fn from(range: SequenceRange) -> Self {
        range.to_string()
    }
}

/// 把相邻或连续的范围合并成最少的区块（输入需按起点升序且互不重叠）
pub fn coalesce(ranges: &[SequenceRange]) -> Vec<SequenceRange> {
    let mut merged: Vec<SequenceRange> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.end.saturating_add(1) >= range.start => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(*range),
        }
    }
    merged
}

/// `1..=total` 中未被 `filled` 覆盖的区间（`filled` 需已合并且有序）
pub fn gaps(filled: &[SequenceRange], total: u32) -> Vec<SequenceRange> {
    if total == 0 {
        return Vec::new();
    }
    gaps_within(filled, SequenceRange { start: 1, end: total })
}

/// `bounds` 中未被 `filled` 覆盖的区间（`filled` 需已合并且有序）
pub fn gaps_within(filled: &[SequenceRange], bounds: SequenceRange) -> Vec<SequenceRange> {
    let mut missing = Vec::new();
    // 下一个待覆盖的位置；越过 u32::MAX 后为 None
    let mut next = Some(bounds.start);

    for range in filled {
        let Some(cursor) = next else { break };
        if cursor > bounds.end {
            break;
        }
        if range.start > cursor {
            missing.push(SequenceRange {
                start: cursor,
                end: (range.start - 1).min(bounds.end),
            });
        }
        if range.end >= cursor {
            next = range.end.checked_add(1);
        }
    }

    if let Some(cursor) = next {
        if cursor <= bounds.end {
            missing.push(SequenceRange {
                start: cursor,
                end: bounds.end,
            });
        }
    }
    missing
}

/// `bounds` 中没有出现在 `positions`（升序，可重复）里的位置，合并为区块
pub fn uncovered(positions: &[u32], bounds: SequenceRange) -> Vec<SequenceRange> {
    let points: Vec<SequenceRange> = positions
        .iter()
        .filter(|n| **n >= 1)
        .map(|&n| SequenceRange { start: n, end: n })
        .collect();
    gaps_within(&coalesce(&points), bounds)
}
