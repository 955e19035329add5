use super::numeric::lenient_f64;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 商品目录记录 (上游 `/vendor/{id}/items` 返回)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// 上游可能返回数字或字符串ID
    #[serde(deserialize_with = "id_as_string")]
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub item_condition: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub selling_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub stock_quantity: f64,
}

impl CatalogItem {
    /// 名称模糊匹配 (忽略大小写，空关键字匹配全部)
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty() || self.name.to_lowercase().contains(&term.to_lowercase())
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "item_id must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_tolerate_strings_and_nulls() {
        let json = r#"{
            "item_id": "IT-9",
            "name": "Denim Jacket",
            "brand": "Levi's",
            "cost_price": "12.50",
            "selling_price": null,
            "stock_quantity": "n/a"
        }"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.cost_price, 12.5);
        assert_eq!(item.selling_price, 0.0);
        assert_eq!(item.stock_quantity, 0.0);
        assert_eq!(item.size, None);
    }

    #[test]
    fn numeric_item_id_is_stringified() {
        let item: CatalogItem =
            serde_json::from_str(r#"{"item_id":42,"name":"Belt"}"#).unwrap();
        assert_eq!(item.item_id, "42");
    }

    #[test]
    fn matches_is_case_insensitive() {
        let item: CatalogItem =
            serde_json::from_str(r#"{"item_id":"1","name":"Wool Scarf"}"#).unwrap();
        assert!(item.matches("scarf"));
        assert!(item.matches(""));
        assert!(!item.matches("hat"));
    }
}
