use crate::backend::StoreBackend;
use crate::error::{AppError, AppResult};
use crate::models::{CategoryNode, CategoryOption, CategoryPayload};
use crate::service::category_tree::{build_tree, find_category, flatten_options};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 新建分类
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_category: Option<String>,
}

/// 修改分类 (名称、描述、父分类)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_category: Option<String>,
}

/// 删除结果: 删除失败的分类会被跳过
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
    pub tree: Vec<CategoryNode>,
}

/// 分类管理服务
///
/// 每次修改后重新拉取并重建分类树。
pub struct CategoryService {
    backend: Arc<dyn StoreBackend>,
}

impl CategoryService {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    pub async fn tree(&self, vendor_id: &str) -> AppResult<Vec<CategoryNode>> {
        let flat = self.backend.list_categories(vendor_id).await?;
        tracing::debug!("Fetched {} flat categories for vendor {}", flat.len(), vendor_id);
        Ok(build_tree(&flat))
    }

    pub async fn options(&self, vendor_id: &str) -> AppResult<Vec<CategoryOption>> {
        Ok(flatten_options(&self.tree(vendor_id).await?))
    }

    pub async fn create(&self, vendor_id: &str, new: NewCategory) -> AppResult<Vec<CategoryNode>> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required.".into()));
        }

        let payload = CategoryPayload {
            vendor_id: vendor_id.to_string(),
            category_id: Some(generate_category_id()),
            name: name.to_string(),
            description: new.description.unwrap_or_default().trim().to_string(),
            parent_category: non_empty(new.parent_category),
            product_count: 0,
        };
        self.backend.create_category(&payload).await?;
        tracing::info!(
            "Created category {:?} ({}) for vendor {}",
            payload.category_id,
            payload.name,
            vendor_id
        );

        self.tree(vendor_id).await
    }

    /// 批量重命名，按顺序逐个调用
    pub async fn rename(
        &self,
        vendor_id: &str,
        category_ids: &[String],
        name: &str,
    ) -> AppResult<Vec<CategoryNode>> {
        if category_ids.is_empty() {
            return Err(AppError::Validation(
                "Please select at least one category to rename.".into(),
            ));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required.".into()));
        }

        for id in category_ids {
            self.backend.rename_category(id, name).await?;
        }
        tracing::info!("Renamed {} categories to {}", category_ids.len(), name);

        self.tree(vendor_id).await
    }

    /// 修改单个分类，保留原商品数量
    pub async fn update(
        &self,
        vendor_id: &str,
        category_id: &str,
        update: CategoryUpdate,
    ) -> AppResult<Vec<CategoryNode>> {
        if update.name.trim().is_empty() {
            return Err(AppError::Validation("Category name is required.".into()));
        }

        let current = self.tree(vendor_id).await?;
        let existing = find_category(&current, category_id)
            .ok_or_else(|| AppError::CategoryNotFound(category_id.to_string()))?;

        let payload = CategoryPayload {
            vendor_id: vendor_id.to_string(),
            category_id: None,
            name: update.name.trim().to_string(),
            description: update.description.unwrap_or_default(),
            parent_category: non_empty(update.parent_category),
            product_count: existing.record.product_count,
        };
        self.backend.update_category(category_id, &payload).await?;
        tracing::info!("Updated category {}", category_id);

        self.tree(vendor_id).await
    }

    /// 批量删除，单个失败只记录日志并继续
    pub async fn delete(&self, vendor_id: &str, category_ids: &[String]) -> AppResult<DeleteOutcome> {
        if category_ids.is_empty() {
            return Err(AppError::Validation("No categories selected.".into()));
        }

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for id in category_ids {
            match self.backend.delete_category(id).await {
                Ok(()) => deleted.push(id.clone()),
                Err(e) => {
                    tracing::error!("Delete category {} failed: {}", id, e);
                    failed.push(id.clone());
                }
            }
        }

        let tree = self.tree(vendor_id).await?;
        Ok(DeleteOutcome {
            deleted,
            failed,
            tree,
        })
    }
}

/// `CAT-` + 当前毫秒时间戳的 36 进制大写
pub fn generate_category_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("CAT-{}", to_base36(millis))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
