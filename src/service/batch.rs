use crate::error::{AppError, AppResult};
use crate::models::numeric::coerce_value;
use crate::models::{BatchCharges, BatchKind, BatchSummary, CatalogItem, LineItem};
use crate::service::allocator;
use chrono::{DateTime, Duration, Local, Utc};
use dashmap::DashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 入库/出库草稿批次
///
/// 只存在于控制台内存中，提交成功后清除。每次修改后都会整体重算分摊。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDraft {
    pub batch_number: String,
    pub kind: BatchKind,
    pub vendor_id: String,
    pub warehouse_id: Option<String>,
    pub lines: Vec<LineItem>,
    pub charges: BatchCharges,
    pub purchase_notes: String,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    /// 提交进行中: 此时拒绝修改、丢弃和重复提交
    pub submitting: bool,
}

/// 新建草稿参数
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBatch {
    pub vendor_id: String,
    pub kind: BatchKind,
    #[serde(default)]
    pub warehouse_id: Option<String>,
    #[serde(default)]
    pub purchase_notes: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// 明细行编辑 (数量为前端原始输入，宽松解析)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEdit {
    #[serde(default)]
    pub quantity: Option<serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BatchDraft {
    pub fn new(request: NewBatch) -> Self {
        Self {
            batch_number: generate_batch_number(request.warehouse_id.as_deref()),
            kind: request.kind,
            vendor_id: request.vendor_id,
            warehouse_id: request.warehouse_id,
            lines: Vec::new(),
            charges: BatchCharges::default(),
            purchase_notes: request.purchase_notes.unwrap_or_default(),
            payment_method: request.payment_method,
            created_at: Utc::now(),
            submitting: false,
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.lines.iter().any(|l| l.product_id == product_id)
    }

    /// 加入商品快照 (每个商品在批次中只能出现一次)
    pub fn add_item(&mut self, item: &CatalogItem) -> AppResult<&LineItem> {
        if self.contains(&item.item_id) {
            return Err(AppError::DuplicateProduct {
                batch_number: self.batch_number.clone(),
                product_id: item.item_id.clone(),
            });
        }
        self.lines.push(LineItem::from_catalog(item));
        self.recompute();
        tracing::info!("{} added to batch {}", item.name, self.batch_number);
        Ok(&self.lines[self.lines.len() - 1])
    }

    pub fn set_quantity(&mut self, product_id: &str, quantity: f64) -> AppResult<()> {
        self.line_mut(product_id)?.quantity = quantity;
        self.recompute();
        Ok(())
    }

    pub fn set_notes(&mut self, product_id: &str, notes: &str) -> AppResult<()> {
        self.line_mut(product_id)?.notes = notes.to_string();
        Ok(())
    }

    /// 按前端原始输入编辑明细: 数量无法解析时为 0
    pub fn apply_edit(&mut self, product_id: &str, edit: &LineEdit) -> AppResult<()> {
        if let Some(raw) = &edit.quantity {
            self.set_quantity(product_id, coerce_value(raw))?;
        }
        if let Some(notes) = &edit.notes {
            self.set_notes(product_id, notes)?;
        }
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: &str) -> AppResult<LineItem> {
        let pos = self
            .lines
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or_else(|| self.line_not_found(product_id))?;
        let removed = self.lines.remove(pos);
        self.recompute();
        Ok(removed)
    }

    /// 设置批次费用，负数按 0 处理
    pub fn set_charges(&mut self, charges: BatchCharges) {
        self.charges = charges.clamped();
        self.recompute();
    }

    pub fn summary(&self) -> BatchSummary {
        allocator::summarize(&self.lines, &self.charges)
    }

    /// 提交前校验: 非空且所有数量大于 0
    pub fn validate_for_submit(&self) -> AppResult<()> {
        if self.lines.is_empty() {
            return Err(AppError::EmptyBatch(self.kind));
        }
        if let Some(line) = self.lines.iter().find(|l| !(l.quantity > 0.0)) {
            return Err(AppError::InvalidQuantity {
                product_id: line.product_id.clone(),
            });
        }
        Ok(())
    }

    fn recompute(&mut self) {
        allocator::allocate_in_place(&mut self.lines, &self.charges);
    }

    fn line_mut(&mut self, product_id: &str) -> AppResult<&mut LineItem> {
        let err = self.line_not_found(product_id);
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(err)
    }

    fn line_not_found(&self, product_id: &str) -> AppError {
        AppError::LineNotFound {
            batch_number: self.batch_number.clone(),
            product_id: product_id.to_string(),
        }
    }
}

/// 批次号: `{仓库ID}-{YYYYMMDD}-{0..999}`，未选仓库时前缀为 `BATCH`
///
/// 仓库ID只保留 ASCII 字母数字、`-` 和 `_`，批次号会出现在导出文件名和响应头里。
pub fn generate_batch_number(warehouse_id: Option<&str>) -> String {
    let prefix: String = warehouse_id
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let prefix = if prefix.is_empty() { "BATCH" } else { prefix.as_str() };
    let date = Local::now().format("%Y%m%d");
    let suffix: u16 = rand::rng().random_range(0..1000);
    format!("{}-{}-{}", prefix, date, suffix)
}

/// 搜索候选商品: 名称匹配且尚未加入批次
pub fn suggestions<'a>(
    catalog: &'a [CatalogItem],
    term: &str,
    draft: &BatchDraft,
) -> Vec<&'a CatalogItem> {
    catalog
        .iter()
        .filter(|item| item.matches(term) && !draft.contains(&item.item_id))
        .collect()
}

/// 草稿存储 (批次号 -> 草稿)
#[derive(Debug, Default)]
pub struct DraftStore {
    drafts: DashMap<String, BatchDraft>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, request: NewBatch) -> BatchDraft {
        let mut draft = BatchDraft::new(request);
        // 随机后缀可能撞号
        while self.drafts.contains_key(&draft.batch_number) {
            draft.batch_number = generate_batch_number(draft.warehouse_id.as_deref());
        }
        tracing::info!(
            "Created {} draft {} for vendor {}",
            draft.kind.label(),
            draft.batch_number,
            draft.vendor_id
        );
        self.drafts
            .insert(draft.batch_number.clone(), draft.clone());
        draft
    }

    pub fn get(&self, batch_number: &str) -> AppResult<BatchDraft> {
        self.drafts
            .get(batch_number)
            .map(|d| d.clone())
            .ok_or_else(|| AppError::BatchNotFound(batch_number.to_string()))
    }

    /// 在条目锁内修改草稿，返回修改后的快照
    ///
    /// 提交中的草稿不可修改。
    pub fn update<F>(&self, batch_number: &str, f: F) -> AppResult<BatchDraft>
    where
        F: FnOnce(&mut BatchDraft) -> AppResult<()>,
    {
        let mut entry = self
            .drafts
            .get_mut(batch_number)
            .ok_or_else(|| AppError::BatchNotFound(batch_number.to_string()))?;
        if entry.submitting {
            return Err(AppError::SubmissionInProgress(batch_number.to_string()));
        }
        f(entry.value_mut())?;
        Ok(entry.value().clone())
    }

    /// 丢弃草稿 (提交中的草稿不可丢弃)
    pub fn remove(&self, batch_number: &str) -> AppResult<BatchDraft> {
        let removed = self
            .drafts
            .remove_if(batch_number, |_, d| !d.submitting)
            .map(|(_, d)| d);
        match removed {
            Some(draft) => Ok(draft),
            None if self.drafts.contains_key(batch_number) => {
                Err(AppError::SubmissionInProgress(batch_number.to_string()))
            }
            None => Err(AppError::BatchNotFound(batch_number.to_string())),
        }
    }

    /// 在条目锁内标记为提交中，返回标记前校验通过的快照
    ///
    /// 同一批次同时只能有一个提交。
    pub fn claim_for_submit(&self, batch_number: &str) -> AppResult<BatchDraft> {
        let mut entry = self
            .drafts
            .get_mut(batch_number)
            .ok_or_else(|| AppError::BatchNotFound(batch_number.to_string()))?;
        if entry.submitting {
            return Err(AppError::SubmissionInProgress(batch_number.to_string()));
        }
        entry.validate_for_submit()?;
        entry.submitting = true;
        Ok(entry.value().clone())
    }

    /// 提交失败后解除标记，草稿保留
    pub fn release(&self, batch_number: &str) {
        if let Some(mut entry) = self.drafts.get_mut(batch_number) {
            entry.submitting = false;
        }
    }

    /// 提交成功后移除草稿
    pub fn finish(&self, batch_number: &str) -> Option<BatchDraft> {
        self.drafts.remove(batch_number).map(|(_, d)| d)
    }

    /// 清理创建时间早于 `max_age` 的草稿 (提交中的除外)，返回清理数量
    pub fn evict_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut evicted = 0;
        self.drafts.retain(|_, d| {
            let keep = d.submitting || d.created_at >= cutoff;
            if !keep {
                evicted += 1;
            }
            keep
        });
        if evicted > 0 {
            tracing::info!("Evicted {} stale draft batches", evicted);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}
