use super::{ApiResponse, AppState};
use crate::error::AppResult;
use crate::export::export_batch_csv;
use crate::models::{
    BatchCharges, BatchSummary, CatalogItem, CategoryNode, CategoryOption, LineItem, StockMove,
    SubmissionReport, TransactionRecord,
};
use crate::service::allocator;
use crate::service::batch::{BatchDraft, LineEdit, NewBatch};
use crate::service::category::{CategoryUpdate, DeleteOutcome, NewCategory};
use crate::service::monitoring::StockLevel;
use crate::service::stock::{AdjustmentRequest, InventoryOverview, MoveRequest};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// 分摊预览请求
#[derive(Debug, Deserialize)]
pub struct AllocationRequest {
    pub lines: Vec<LineItem>,
    #[serde(default)]
    pub charges: BatchCharges,
}

/// 分摊预览响应
#[derive(Debug, Serialize)]
pub struct AllocationPreview {
    pub lines: Vec<LineItem>,
    pub summary: BatchSummary,
}

/// 草稿及其汇总
#[derive(Debug, Serialize)]
pub struct BatchView {
    pub batch: BatchDraft,
    pub summary: BatchSummary,
}

impl From<BatchDraft> for BatchView {
    fn from(batch: BatchDraft) -> Self {
        let summary = batch.summary();
        Self { batch, summary }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub category_ids: Vec<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub category_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub item_id: String,
}

/// 搜索关键字 (`?q=`)
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

type JsonResult<T> = AppResult<Json<ApiResponse<T>>>;

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn category_tree(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> JsonResult<Vec<CategoryNode>> {
    let tree = state.categories.tree(&vendor_id).await?;
    Ok(Json(ApiResponse::ok(
        format!("{} root categories", tree.len()),
        tree,
    )))
}

pub async fn category_options(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> JsonResult<Vec<CategoryOption>> {
    let options = state.categories.options(&vendor_id).await?;
    Ok(Json(ApiResponse::ok(
        format!("{} categories", options.len()),
        options,
    )))
}

pub async fn create_category(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(req): Json<NewCategory>,
) -> JsonResult<Vec<CategoryNode>> {
    let tree = state.categories.create(&vendor_id, req).await?;
    Ok(Json(ApiResponse::ok("Category created successfully.", tree)))
}

pub async fn rename_categories(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(req): Json<RenameRequest>,
) -> JsonResult<Vec<CategoryNode>> {
    let tree = state
        .categories
        .rename(&vendor_id, &req.category_ids, &req.name)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Category(ies) renamed successfully!",
        tree,
    )))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path((vendor_id, category_id)): Path<(String, String)>,
    Json(req): Json<CategoryUpdate>,
) -> JsonResult<Vec<CategoryNode>> {
    let tree = state
        .categories
        .update(&vendor_id, &category_id, req)
        .await?;
    Ok(Json(ApiResponse::ok("Category updated successfully.", tree)))
}

pub async fn delete_categories(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(req): Json<DeleteRequest>,
) -> JsonResult<DeleteOutcome> {
    let outcome = state.categories.delete(&vendor_id, &req.category_ids).await?;
    let message = format!("Deleted categories: {}", outcome.deleted.join(", "));
    Ok(Json(ApiResponse::ok(message, outcome)))
}

pub async fn inventory_overview(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> JsonResult<InventoryOverview> {
    let overview = state.stock.overview(&vendor_id).await?;
    let message = format!(
        "{} root categories, {} items",
        overview.categories.len(),
        overview.items.len()
    );
    Ok(Json(ApiResponse::ok(message, overview)))
}

pub async fn create_adjustment(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(req): Json<AdjustmentRequest>,
) -> JsonResult<()> {
    state.stock.adjust(&vendor_id, req).await?;
    Ok(Json(ApiResponse::ok("Adjustment Successful!", ())))
}

pub async fn transaction_history(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Query(query): Query<SearchQuery>,
) -> JsonResult<Vec<TransactionRecord>> {
    let history = state.stock.transactions(&vendor_id, &query.q).await?;
    Ok(Json(ApiResponse::ok(
        format!("{} transactions", history.len()),
        history,
    )))
}

pub async fn stock_levels(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Query(query): Query<SearchQuery>,
) -> JsonResult<Vec<StockLevel>> {
    let levels = state.stock.stock_levels(&vendor_id, &query.q).await?;
    Ok(Json(ApiResponse::ok(format!("{} items", levels.len()), levels)))
}

pub async fn create_stock_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> JsonResult<StockMove> {
    let stock_move = state.stock.move_stock(req).await?;
    Ok(Json(ApiResponse::ok(
        "Move Stock transaction recorded successfully!",
        stock_move,
    )))
}

/// 纯计算: 不落草稿，直接返回分摊结果
pub async fn preview_allocation(Json(req): Json<AllocationRequest>) -> Json<ApiResponse<AllocationPreview>> {
    let lines = allocator::allocate(&req.lines, &req.charges);
    let summary = allocator::summarize(&lines, &req.charges);
    Json(ApiResponse::ok(
        format!("Allocated charges across {} lines", lines.len()),
        AllocationPreview { lines, summary },
    ))
}

pub async fn create_batch(
    State(state): State<AppState>,
    Json(req): Json<NewBatch>,
) -> AppResult<(StatusCode, Json<ApiResponse<BatchView>>)> {
    let draft = state.stock.create_draft(req)?;
    let message = format!("Batch {} created", draft.batch_number);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(message, draft.into())),
    ))
}

pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_number): Path<String>,
) -> JsonResult<BatchView> {
    let draft = state.stock.drafts().get(&batch_number)?;
    Ok(Json(ApiResponse::ok(
        format!("{} lines", draft.lines.len()),
        draft.into(),
    )))
}

pub async fn discard_batch(
    State(state): State<AppState>,
    Path(batch_number): Path<String>,
) -> JsonResult<()> {
    state.stock.drafts().remove(&batch_number)?;
    tracing::info!("Batch {} discarded", batch_number);
    Ok(Json(ApiResponse::ok(format!("Batch {} discarded", batch_number), ())))
}

pub async fn add_batch_item(
    State(state): State<AppState>,
    Path(batch_number): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> JsonResult<BatchView> {
    let draft = state.stock.add_item(&batch_number, &req.item_id).await?;
    let name = draft
        .lines
        .iter()
        .find(|l| l.product_id == req.item_id)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| req.item_id.clone());
    Ok(Json(ApiResponse::ok(
        format!("{} added to the list.", name),
        draft.into(),
    )))
}

pub async fn edit_batch_item(
    State(state): State<AppState>,
    Path((batch_number, product_id)): Path<(String, String)>,
    Json(edit): Json<LineEdit>,
) -> JsonResult<BatchView> {
    let draft = state.stock.edit_line(&batch_number, &product_id, &edit)?;
    Ok(Json(ApiResponse::ok("Item updated.", draft.into())))
}

pub async fn remove_batch_item(
    State(state): State<AppState>,
    Path((batch_number, product_id)): Path<(String, String)>,
) -> JsonResult<BatchView> {
    let draft = state.stock.remove_line(&batch_number, &product_id)?;
    Ok(Json(ApiResponse::ok("Item removed.", draft.into())))
}

pub async fn set_batch_charges(
    State(state): State<AppState>,
    Path(batch_number): Path<String>,
    Json(charges): Json<BatchCharges>,
) -> JsonResult<BatchView> {
    let draft = state.stock.drafts().update(&batch_number, |draft| {
        draft.set_charges(charges);
        Ok(())
    })?;
    Ok(Json(ApiResponse::ok("Charges updated.", draft.into())))
}

pub async fn batch_suggestions(
    State(state): State<AppState>,
    Path(batch_number): Path<String>,
    Query(query): Query<SearchQuery>,
) -> JsonResult<Vec<CatalogItem>> {
    let items = state.stock.suggestions(&batch_number, &query.q).await?;
    Ok(Json(ApiResponse::ok(
        format!("{} matching items", items.len()),
        items,
    )))
}

pub async fn export_batch(
    State(state): State<AppState>,
    Path(batch_number): Path<String>,
) -> AppResult<Response> {
    let draft = state.stock.drafts().get(&batch_number)?;
    let body = export_batch_csv(&draft)?;
    let disposition = format!("attachment; filename=\"{}.csv\"", batch_number);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub async fn submit_batch(
    State(state): State<AppState>,
    Path(batch_number): Path<String>,
) -> JsonResult<SubmissionReport> {
    let report = state.stock.submit(&batch_number).await?;
    let label = report.kind.map(|k| k.label()).unwrap_or("stock");
    let message = format!(
        "{} transaction recorded successfully!",
        capitalize(label)
    );
    Ok(Json(ApiResponse::ok(message, report)))
}

fn capitalize(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
