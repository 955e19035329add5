use crate::backend::{BackendError, StoreBackend};
use crate::error::{AppError, AppResult};
use crate::models::{
    BatchKind, CatalogItem, CategoryNode, MovedProduct, StockAdjustment, StockMove,
    StockTransaction, StockUpdate, SubmissionReport, TransactionRecord,
};
use crate::service::batch::{suggestions, BatchDraft, DraftStore, LineEdit, NewBatch};
use crate::service::category_tree::build_tree;
use crate::service::monitoring::{self, StockLevel, DEFAULT_REORDER_LEVEL};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PERFORMED_BY_VENDOR: &str = "vendor";

/// 调整请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub item_id: String,
    pub quantity: f64,
    pub adjustment_type: BatchKind,
}

/// 移库请求
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    #[serde(default)]
    pub warehouse_id: Option<String>,
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub performed_by: Option<String>,
    #[serde(default)]
    pub source_location: String,
    #[serde(default)]
    pub destination_location: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub quantity: f64,
}

/// 库存总览: 分类树 + 商品目录
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOverview {
    pub categories: Vec<CategoryNode>,
    pub items: Vec<CatalogItem>,
}

/// 库存服务: 草稿批次、提交、调整与移库
pub struct StockService {
    backend: Arc<dyn StoreBackend>,
    drafts: DraftStore,
    reorder_level: f64,
}

impl StockService {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            drafts: DraftStore::new(),
            reorder_level: DEFAULT_REORDER_LEVEL,
        }
    }

    pub fn with_reorder_level(mut self, reorder_level: f64) -> Self {
        self.reorder_level = reorder_level;
        self
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn create_draft(&self, request: NewBatch) -> AppResult<BatchDraft> {
        if request.vendor_id.trim().is_empty() {
            return Err(AppError::Validation("Vendor is required.".into()));
        }
        Ok(self.drafts.create(request))
    }

    /// 从上游目录中取商品快照加入草稿
    pub async fn add_item(&self, batch_number: &str, item_id: &str) -> AppResult<BatchDraft> {
        let vendor_id = self.drafts.get(batch_number)?.vendor_id;
        let catalog = self.backend.list_items(&vendor_id).await?;
        let item = catalog
            .into_iter()
            .find(|i| i.item_id == item_id)
            .ok_or_else(|| AppError::CatalogItemNotFound(item_id.to_string()))?;

        self.drafts
            .update(batch_number, |draft| draft.add_item(&item).map(|_| ()))
    }

    pub fn edit_line(
        &self,
        batch_number: &str,
        product_id: &str,
        edit: &LineEdit,
    ) -> AppResult<BatchDraft> {
        self.drafts
            .update(batch_number, |draft| draft.apply_edit(product_id, edit))
    }

    pub fn remove_line(&self, batch_number: &str, product_id: &str) -> AppResult<BatchDraft> {
        let draft = self.drafts.update(batch_number, |draft| {
            draft.remove_line(product_id).map(|_| ())
        })?;
        tracing::info!("Item {} removed from batch {}", product_id, batch_number);
        Ok(draft)
    }

    pub async fn suggestions(&self, batch_number: &str, term: &str) -> AppResult<Vec<CatalogItem>> {
        let draft = self.drafts.get(batch_number)?;
        let catalog = self.backend.list_items(&draft.vendor_id).await?;
        Ok(suggestions(&catalog, term, &draft)
            .into_iter()
            .cloned()
            .collect())
    }

    /// 提交草稿
    ///
    /// 先逐行更新库存，再逐行写入交易记录。两个阶段都按顺序执行，
    /// 遇到第一个失败即停止；已生效的请求不回滚，报告随错误返回。
    /// 提交期间草稿被锁定 (不可修改、不可重复提交)；全部成功后清除草稿，
    /// 失败则解除锁定并保留草稿。
    pub async fn submit(&self, batch_number: &str) -> AppResult<SubmissionReport> {
        let draft = self.drafts.claim_for_submit(batch_number)?;
        let mut claim = SubmitClaim {
            drafts: &self.drafts,
            batch_number,
            finished: false,
        };

        let report = self.apply(&draft).await?;
        self.drafts.finish(batch_number);
        claim.finished = true;

        tracing::info!(
            "Batch {} submitted: {} stock updates, {} transactions",
            batch_number,
            report.stock_updates_applied.len(),
            report.transactions_recorded.len()
        );
        Ok(report)
    }

    async fn apply(&self, draft: &BatchDraft) -> AppResult<SubmissionReport> {
        let batch_number = draft.batch_number.as_str();

        let mut report = SubmissionReport::new(batch_number, draft.kind, draft.lines.len());
        tracing::info!(
            "Submitting {} batch {}: {} lines",
            draft.kind.label(),
            batch_number,
            draft.lines.len()
        );

        for (idx, line) in draft.lines.iter().enumerate() {
            let update = StockUpdate {
                operation: draft.kind.stock_operation().to_string(),
                quantity: line.quantity,
                new_selling_price: match draft.kind {
                    BatchKind::StockIn => line.final_unit_price(),
                    BatchKind::StockOut => None,
                },
            };
            if let Err(source) = self.backend.update_stock(&line.product_id, &update).await {
                return Err(partial(report, source));
            }
            report.stock_updates_applied.push(line.product_id.clone());
            tracing::debug!(
                "库存更新进度: {}/{}, 商品 {}",
                idx + 1,
                draft.lines.len(),
                line.product_id
            );
        }

        for line in &draft.lines {
            let transaction = StockTransaction {
                transaction_type: draft.kind.transaction_type().to_string(),
                item_id: line.product_id.clone(),
                vendor_id: draft.vendor_id.clone(),
                performed_by: PERFORMED_BY_VENDOR.to_string(),
                quantity: line.quantity,
            };
            if let Err(source) = self.backend.create_transaction(&transaction).await {
                return Err(partial(report, source));
            }
            report.transactions_recorded.push(line.product_id.clone());
        }

        report.submitted_at = Some(Utc::now());
        Ok(report)
    }

    pub async fn adjust(&self, vendor_id: &str, request: AdjustmentRequest) -> AppResult<()> {
        if request.item_id.trim().is_empty() {
            return Err(AppError::Validation("Please select an item.".into()));
        }
        if !(request.quantity > 0.0) {
            return Err(AppError::Validation(
                "Adjustment quantity must be greater than zero.".into(),
            ));
        }

        let adjustment = StockAdjustment {
            vendor_id: vendor_id.to_string(),
            item_id: request.item_id,
            quantity: request.quantity,
            adjustment_type: request.adjustment_type.transaction_type().to_string(),
        };
        self.backend.create_adjustment(&adjustment).await?;
        tracing::info!(
            "Adjustment {} of {} recorded for item {}",
            adjustment.adjustment_type,
            adjustment.quantity,
            adjustment.item_id
        );
        Ok(())
    }

    pub async fn move_stock(&self, request: MoveRequest) -> AppResult<StockMove> {
        let warehouse_id = request
            .warehouse_id
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .ok_or_else(|| AppError::Validation("Please select a warehouse first.".into()))?
            .to_string();

        if request.source_location.trim().is_empty()
            || request.destination_location.trim().is_empty()
            || request.item_name.trim().is_empty()
            || request.quantity == 0.0
        {
            return Err(AppError::Validation("Please fill in all fields.".into()));
        }

        let stock_move = StockMove {
            transaction_type: "moveStock".to_string(),
            warehouse_id,
            seller_id: request.seller_id.unwrap_or_default(),
            performed_by: request
                .performed_by
                .unwrap_or_else(|| PERFORMED_BY_VENDOR.to_string()),
            source_location: request.source_location,
            destination_location: request.destination_location,
            products: vec![MovedProduct {
                product_id: request.product_id.unwrap_or_default(),
                variant_id: None,
                quantity: request.quantity,
            }],
            notes: format!("Moving {} of {}", request.quantity, request.item_name),
        };
        self.backend.create_move(&stock_move).await?;
        tracing::info!("Move stock transaction recorded: {}", stock_move.notes);
        Ok(stock_move)
    }

    /// 交易历史，按类型、备注或交易号过滤
    pub async fn transactions(&self, vendor_id: &str, term: &str) -> AppResult<Vec<TransactionRecord>> {
        let history = self.backend.list_transactions(vendor_id).await?;
        let total = history.len();
        let matched: Vec<TransactionRecord> =
            history.into_iter().filter(|tx| tx.matches(term)).collect();
        tracing::debug!(
            "Vendor {} transactions: {} of {} match {:?}",
            vendor_id,
            matched.len(),
            total,
            term
        );
        Ok(matched)
    }

    /// 库存水位监控
    pub async fn stock_levels(&self, vendor_id: &str, term: &str) -> AppResult<Vec<StockLevel>> {
        let catalog = self.backend.list_items(vendor_id).await?;
        Ok(monitoring::stock_levels(&catalog, term, self.reorder_level))
    }

    /// 同时拉取分类和商品目录
    pub async fn overview(&self, vendor_id: &str) -> AppResult<InventoryOverview> {
        let (categories, items) = futures::try_join!(
            self.backend.list_categories(vendor_id),
            self.backend.list_items(vendor_id),
        )?;
        Ok(InventoryOverview {
            categories: build_tree(&categories),
            items,
        })
    }
}

/// 提交锁: 提交失败或被取消时解除草稿的提交中标记
struct SubmitClaim<'a> {
    drafts: &'a DraftStore,
    batch_number: &'a str,
    finished: bool,
}

impl Drop for SubmitClaim<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.drafts.release(self.batch_number);
        }
    }
}

fn partial(report: SubmissionReport, source: BackendError) -> AppError {
    tracing::error!(
        "✗ Batch {} failed after {} stock updates and {} transactions: {}",
        report.batch_number,
        report.stock_updates_applied.len(),
        report.transactions_recorded.len(),
        source
    );
    AppError::PartialSubmission { report, source }
}
