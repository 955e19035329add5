use serde::{Deserialize, Deserializer, Serialize};

/// 分类记录 (上游 vendor-categories 接口返回的扁平结构)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 父分类ID，空字符串视为无父分类
    #[serde(default, deserialize_with = "empty_as_none")]
    pub parent_category: Option<String>,
    #[serde(default)]
    pub product_count: i64,
}

/// 分类树节点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(flatten)]
    pub record: CategoryRecord,
    pub sub_categories: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn new(record: CategoryRecord) -> Self {
        Self {
            record,
            sub_categories: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.record.category_id
    }
}

/// 下拉框选项 (先序遍历展开后的分类)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOption {
    pub category_id: String,
    pub name: String,
    pub depth: usize,
    pub label: String,
}

/// 新建分类请求体 (发往上游)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[serde(rename = "vendor_id")]
    pub vendor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub name: String,
    pub description: String,
    pub parent_category: Option<String>,
    pub product_count: i64,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
