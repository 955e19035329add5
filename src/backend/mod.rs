//! 上游商城后端
//!
//! 上游是黑盒 REST 服务，这里只定义控制台用到的调用。

pub mod client;
pub mod http;

use crate::models::{
    CatalogItem, CategoryPayload, CategoryRecord, StockAdjustment, StockMove, StockTransaction,
    StockUpdate, TransactionRecord,
};
use async_trait::async_trait;

pub use client::create_client;
pub use http::HttpStoreBackend;

/// 上游调用错误
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// 请求本身失败 (网络、DNS、超时等)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 上游返回非 2xx
    #[error("Backend error ({status}): {body}")]
    Status { status: u16, body: String },

    /// 基础地址无法解析，或路径参数为空、`.`、`..`
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),
}

/// 上游后端接口
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn list_categories(&self, vendor_id: &str) -> Result<Vec<CategoryRecord>, BackendError>;

    async fn create_category(&self, payload: &CategoryPayload) -> Result<(), BackendError>;

    async fn rename_category(&self, category_id: &str, name: &str) -> Result<(), BackendError>;

    async fn update_category(
        &self,
        category_id: &str,
        payload: &CategoryPayload,
    ) -> Result<(), BackendError>;

    async fn delete_category(&self, category_id: &str) -> Result<(), BackendError>;

    async fn list_items(&self, vendor_id: &str) -> Result<Vec<CatalogItem>, BackendError>;

    async fn update_stock(&self, item_id: &str, update: &StockUpdate) -> Result<(), BackendError>;

    async fn create_transaction(&self, transaction: &StockTransaction) -> Result<(), BackendError>;

    async fn create_adjustment(&self, adjustment: &StockAdjustment) -> Result<(), BackendError>;

    async fn create_move(&self, stock_move: &StockMove) -> Result<(), BackendError>;

    async fn list_transactions(&self, vendor_id: &str)
        -> Result<Vec<TransactionRecord>, BackendError>;
}
