use super::numeric::lenient_f64;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 库存更新请求 (`PUT /item/updateStock/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub operation: String,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_selling_price: Option<f64>,
}

/// 库存交易记录 (`POST /Stock-transactions/create`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockTransaction {
    pub transaction_type: String,
    pub item_id: String,
    pub vendor_id: String,
    pub performed_by: String,
    pub quantity: f64,
}

/// 单品库存调整 (`POST /adjustment`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    #[serde(default)]
    pub vendor_id: String,
    pub item_id: String,
    pub quantity: f64,
    pub adjustment_type: String,
}

/// 移库商品行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovedProduct {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: f64,
}

/// 移库交易 (`POST /stockTransactions`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMove {
    pub transaction_type: String,
    pub warehouse_id: String,
    pub seller_id: String,
    pub performed_by: String,
    pub source_location: String,
    pub destination_location: String,
    pub products: Vec<MovedProduct>,
    pub notes: String,
}

/// 上游交易历史记录 (`GET /Stock-transactions/vendor/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// 上游可能返回数字或字符串
    #[serde(default, deserialize_with = "opt_id_as_string")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_type: String,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub performed_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TransactionRecord {
    /// 按类型、备注或交易号模糊匹配 (忽略大小写，空关键字匹配全部)
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let contains = |field: Option<&str>| {
            field
                .map(|v| v.to_lowercase().contains(&term))
                .unwrap_or(false)
        };
        contains(Some(self.transaction_type.as_str()))
            || contains(self.notes.as_deref())
            || contains(self.transaction_id.as_deref())
    }
}

fn opt_id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
