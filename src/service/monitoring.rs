use crate::models::CatalogItem;
use serde::Serialize;

/// 默认补货线
pub const DEFAULT_REORDER_LEVEL: f64 = 10.0;

/// 库存水位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StockStatus {
    /// 不高于补货线
    Critical,
    /// 不高于两倍补货线
    Warning,
    Healthy,
}

/// 单个商品的库存水位
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub item_id: String,
    pub name: String,
    pub stock_quantity: f64,
    pub status: StockStatus,
}

pub fn classify(stock: f64, reorder_level: f64) -> StockStatus {
    if stock <= reorder_level {
        StockStatus::Critical
    } else if stock <= reorder_level * 2.0 {
        StockStatus::Warning
    } else {
        StockStatus::Healthy
    }
}

/// 按名称过滤后逐个分级，保持目录顺序
pub fn stock_levels(catalog: &[CatalogItem], term: &str, reorder_level: f64) -> Vec<StockLevel> {
    catalog
        .iter()
        .filter(|item| item.matches(term))
        .map(|item| StockLevel {
            item_id: item.item_id.clone(),
            name: item.name.clone(),
            stock_quantity: item.stock_quantity,
            status: classify(item.stock_quantity, reorder_level),
        })
        .collect()
}
