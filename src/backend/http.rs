use super::{BackendError, StoreBackend};
use crate::models::{
    CatalogItem, CategoryPayload, CategoryRecord, StockAdjustment, StockMove, StockTransaction,
    StockUpdate, TransactionRecord,
};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

/// 基于 reqwest 的上游实现
#[derive(Debug, Clone)]
pub struct HttpStoreBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpStoreBackend {
    /// `base_url` 例如 `http://localhost:3000/api`
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// 逐段拼接路径，每段单独转义 (ID 中的 `/` 不会变成新的路径层级)
    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(BackendError::InvalidUrl(format!(
                "invalid path segment {:?}",
                bad
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, BackendError> {
        let url = self.url(segments)?;
        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        let response = ensure_success(response).await?;
        let body = response.json::<T>().await?;
        tracing::debug!("GET {} 完成, 耗时: {:?}", url.path(), start.elapsed());
        Ok(body)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), BackendError> {
        let url = self.url(segments)?;
        let start = Instant::now();
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        ensure_success(request.send().await?).await?;
        tracing::debug!("{} {} 完成, 耗时: {:?}", method, url.path(), start.elapsed());
        Ok(())
    }
}

/// 非 2xx 响应转换为 [`BackendError::Status`]
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        tracing::error!("✗ 上游返回 {}: {}", status, body);
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

#[async_trait]
impl StoreBackend for HttpStoreBackend {
    async fn list_categories(&self, vendor_id: &str) -> Result<Vec<CategoryRecord>, BackendError> {
        self.get_json(&["vendor-categories", "categories", "vendor", vendor_id])
            .await
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<(), BackendError> {
        self.send_json(
            Method::POST,
            &["vendor-categories", "category"],
            Some(payload),
        )
        .await
    }

    async fn rename_category(&self, category_id: &str, name: &str) -> Result<(), BackendError> {
        let body = serde_json::json!({ "name": name });
        self.send_json(
            Method::PATCH,
            &["vendor-categories", "category", category_id, "rename"],
            Some(&body),
        )
        .await
    }

    async fn update_category(
        &self,
        category_id: &str,
        payload: &CategoryPayload,
    ) -> Result<(), BackendError> {
        self.send_json(
            Method::PUT,
            &["vendor-categories", "category", category_id],
            Some(payload),
        )
        .await
    }

    async fn delete_category(&self, category_id: &str) -> Result<(), BackendError> {
        self.send_json::<()>(
            Method::DELETE,
            &["vendor-categories", "category", category_id],
            None,
        )
        .await
    }

    async fn list_items(&self, vendor_id: &str) -> Result<Vec<CatalogItem>, BackendError> {
        self.get_json(&["vendor", vendor_id, "items"]).await
    }

    async fn update_stock(&self, item_id: &str, update: &StockUpdate) -> Result<(), BackendError> {
        self.send_json(Method::PUT, &["item", "updateStock", item_id], Some(update))
            .await
    }

    async fn create_transaction(&self, transaction: &StockTransaction) -> Result<(), BackendError> {
        self.send_json(
            Method::POST,
            &["Stock-transactions", "create"],
            Some(transaction),
        )
        .await
    }

    async fn create_adjustment(&self, adjustment: &StockAdjustment) -> Result<(), BackendError> {
        self.send_json(Method::POST, &["adjustment"], Some(adjustment))
            .await
    }

    async fn create_move(&self, stock_move: &StockMove) -> Result<(), BackendError> {
        self.send_json(Method::POST, &["stockTransactions"], Some(stock_move))
            .await
    }

    async fn list_transactions(
        &self,
        vendor_id: &str,
    ) -> Result<Vec<TransactionRecord>, BackendError> {
        self.get_json(&["Stock-transactions", "vendor", vendor_id])
            .await
    }
}
