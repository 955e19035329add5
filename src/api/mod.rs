pub mod handlers;

use crate::backend::StoreBackend;
use crate::config::InventoryConfig;
use crate::service::{CategoryService, StockService};
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;

pub use handlers::*;

/// 共享状态：分类服务与库存服务
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryService>,
    pub stock: Arc<StockService>,
}

impl AppState {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self::with_inventory(backend, &InventoryConfig::default())
    }

    pub fn with_inventory(backend: Arc<dyn StoreBackend>, inventory: &InventoryConfig) -> Self {
        Self {
            categories: Arc::new(CategoryService::new(backend.clone())),
            stock: Arc::new(
                StockService::new(backend).with_reorder_level(inventory.reorder_level),
            ),
        }
    }
}

/// 统一响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    let vendor_routes = Router::new()
        .route("/:vendor_id/categories/tree", get(handlers::category_tree))
        .route("/:vendor_id/categories/options", get(handlers::category_options))
        .route("/:vendor_id/categories", post(handlers::create_category))
        .route("/:vendor_id/categories/rename", patch(handlers::rename_categories))
        .route("/:vendor_id/categories/delete", post(handlers::delete_categories))
        .route(
            "/:vendor_id/categories/:category_id",
            put(handlers::update_category),
        )
        .route("/:vendor_id/overview", get(handlers::inventory_overview))
        .route("/:vendor_id/adjustments", post(handlers::create_adjustment))
        .route("/:vendor_id/transactions", get(handlers::transaction_history))
        .route("/:vendor_id/stock-levels", get(handlers::stock_levels));

    let batch_routes = Router::new()
        .route("/", post(handlers::create_batch))
        .route(
            "/:batch_number",
            get(handlers::get_batch).delete(handlers::discard_batch),
        )
        .route("/:batch_number/items", post(handlers::add_batch_item))
        .route(
            "/:batch_number/items/:product_id",
            patch(handlers::edit_batch_item).delete(handlers::remove_batch_item),
        )
        .route("/:batch_number/charges", put(handlers::set_batch_charges))
        .route("/:batch_number/suggestions", get(handlers::batch_suggestions))
        .route("/:batch_number/export.csv", get(handlers::export_batch))
        .route("/:batch_number/submit", post(handlers::submit_batch));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/allocations/preview", post(handlers::preview_allocation))
        .route("/api/stock-moves", post(handlers::create_stock_move))
        .nest("/api/vendors", vendor_routes)
        .nest("/api/batches", batch_routes)
        .layer(ServiceBuilder::new())
        .with_state(state)
}
