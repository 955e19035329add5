use chrono::{DateTime, Utc};
use serde::Serialize;

use super::line_item::BatchKind;

/// 批次提交结果
///
/// 提交不是原子操作: 失败时报告里记录已经生效的上游请求。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub batch_number: String,
    pub kind: Option<BatchKind>,
    /// 已更新库存的商品ID
    pub stock_updates_applied: Vec<String>,
    /// 已写入交易记录的商品ID
    pub transactions_recorded: Vec<String>,
    pub total_lines: usize,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl SubmissionReport {
    pub fn new(batch_number: &str, kind: BatchKind, total_lines: usize) -> Self {
        Self {
            batch_number: batch_number.to_string(),
            kind: Some(kind),
            total_lines,
            ..Default::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.stock_updates_applied.len() == self.total_lines
            && self.transactions_recorded.len() == self.total_lines
    }
}
