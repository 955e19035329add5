//! Shared test helpers: an in-memory upstream store and HTTP helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use std::sync::{Arc, Mutex};
use thrift_vendor_console::backend::{BackendError, StoreBackend};
use thrift_vendor_console::models::{
    CatalogItem, CategoryPayload, CategoryRecord, StockAdjustment, StockMove, StockTransaction,
    StockUpdate, TransactionRecord,
};
use thrift_vendor_console::{router, AppState};
use tower::ServiceExt;

#[derive(Debug, Default)]
pub struct FakeState {
    pub categories: Vec<CategoryRecord>,
    pub items: Vec<CatalogItem>,
    pub stock_updates: Vec<(String, StockUpdate)>,
    pub transactions: Vec<StockTransaction>,
    pub adjustments: Vec<StockAdjustment>,
    pub moves: Vec<StockMove>,
    pub history: Vec<TransactionRecord>,
    /// Product id whose stock update fails with a 500.
    pub fail_update_on: Option<String>,
    /// Product id whose transaction record fails with a 500.
    pub fail_transaction_on: Option<String>,
    /// Category id whose delete fails with a 404.
    pub fail_delete_on: Option<String>,
}

/// In-memory stand-in for the store backend.
#[derive(Debug, Default, Clone)]
pub struct FakeStore {
    pub state: Arc<Mutex<FakeState>>,
}

fn server_error(body: &str) -> BackendError {
    BackendError::Status {
        status: 500,
        body: body.to_string(),
    }
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(self, categories: Vec<CategoryRecord>) -> Self {
        self.state.lock().unwrap().categories = categories;
        self
    }

    pub fn with_items(self, items: Vec<CatalogItem>) -> Self {
        self.state.lock().unwrap().items = items;
        self
    }

    pub fn with_history(self, history: Vec<TransactionRecord>) -> Self {
        self.state.lock().unwrap().history = history;
        self
    }

    pub fn fail_update_on(&self, product_id: &str) {
        self.state.lock().unwrap().fail_update_on = Some(product_id.to_string());
    }

    pub fn fail_transaction_on(&self, product_id: &str) {
        self.state.lock().unwrap().fail_transaction_on = Some(product_id.to_string());
    }

    pub fn fail_delete_on(&self, category_id: &str) {
        self.state.lock().unwrap().fail_delete_on = Some(category_id.to_string());
    }
}

#[async_trait]
impl StoreBackend for FakeStore {
    async fn list_categories(&self, _vendor_id: &str) -> Result<Vec<CategoryRecord>, BackendError> {
        Ok(self.state.lock().unwrap().categories.clone())
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<(), BackendError> {
        let record = CategoryRecord {
            category_id: payload.category_id.clone().unwrap_or_default(),
            name: payload.name.clone(),
            description: Some(payload.description.clone()),
            parent_category: payload.parent_category.clone(),
            product_count: payload.product_count,
        };
        self.state.lock().unwrap().categories.push(record);
        Ok(())
    }

    async fn rename_category(&self, category_id: &str, name: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .categories
            .iter_mut()
            .find(|c| c.category_id == category_id)
            .ok_or_else(|| server_error("no such category"))?;
        record.name = name.to_string();
        Ok(())
    }

    async fn update_category(
        &self,
        category_id: &str,
        payload: &CategoryPayload,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .categories
            .iter_mut()
            .find(|c| c.category_id == category_id)
            .ok_or_else(|| server_error("no such category"))?;
        record.name = payload.name.clone();
        record.description = Some(payload.description.clone());
        record.parent_category = payload.parent_category.clone();
        record.product_count = payload.product_count;
        Ok(())
    }

    async fn delete_category(&self, category_id: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delete_on.as_deref() == Some(category_id) {
            return Err(BackendError::Status {
                status: 404,
                body: "not found".to_string(),
            });
        }
        state.categories.retain(|c| c.category_id != category_id);
        Ok(())
    }

    async fn list_items(&self, _vendor_id: &str) -> Result<Vec<CatalogItem>, BackendError> {
        Ok(self.state.lock().unwrap().items.clone())
    }

    async fn update_stock(&self, item_id: &str, update: &StockUpdate) -> Result<(), BackendError> {
        // 模拟网络往返，让并发请求交错执行
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        if state.fail_update_on.as_deref() == Some(item_id) {
            return Err(server_error("stock update failed"));
        }
        state
            .stock_updates
            .push((item_id.to_string(), update.clone()));
        Ok(())
    }

    async fn create_transaction(&self, transaction: &StockTransaction) -> Result<(), BackendError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        if state.fail_transaction_on.as_deref() == Some(transaction.item_id.as_str()) {
            return Err(server_error("transaction failed"));
        }
        state.transactions.push(transaction.clone());
        Ok(())
    }

    async fn create_adjustment(&self, adjustment: &StockAdjustment) -> Result<(), BackendError> {
        self.state
            .lock()
            .unwrap()
            .adjustments
            .push(adjustment.clone());
        Ok(())
    }

    async fn create_move(&self, stock_move: &StockMove) -> Result<(), BackendError> {
        self.state.lock().unwrap().moves.push(stock_move.clone());
        Ok(())
    }

    async fn list_transactions(
        &self,
        _vendor_id: &str,
    ) -> Result<Vec<TransactionRecord>, BackendError> {
        Ok(self.state.lock().unwrap().history.clone())
    }
}

pub fn category(id: &str, name: &str, parent: Option<&str>) -> CategoryRecord {
    CategoryRecord {
        category_id: id.to_string(),
        name: name.to_string(),
        description: None,
        parent_category: parent.map(str::to_string),
        product_count: 0,
    }
}

pub fn catalog_item(id: &str, name: &str, selling_price: f64, stock: f64) -> CatalogItem {
    serde_json::from_value(serde_json::json!({
        "item_id": id,
        "name": name,
        "brand": "Thrift",
        "cost_price": selling_price / 2.0,
        "selling_price": selling_price,
        "stock_quantity": stock
    }))
    .unwrap()
}

pub fn history_record(id: &str, kind: &str, notes: Option<&str>) -> TransactionRecord {
    TransactionRecord {
        id: Some(format!("oid-{}", id)),
        transaction_id: Some(id.to_string()),
        transaction_type: kind.to_string(),
        item_id: Some("P1".to_string()),
        quantity: 1.0,
        notes: notes.map(str::to_string),
        performed_by: Some("vendor".to_string()),
        created_at: None,
    }
}

pub fn build_test_app(store: FakeStore) -> Router {
    router(AppState::new(Arc::new(store)))
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
