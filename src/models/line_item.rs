use super::catalog::CatalogItem;
use super::numeric::lenient_f64;
use serde::{Deserialize, Serialize};

const NOT_AVAILABLE: &str = "N/A";

/// 批次明细行 (入库/出库草稿中的一条商品)
///
/// 描述字段与价格均为加入批次时的商品快照，不随目录变化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default = "not_available")]
    pub size: String,
    #[serde(default = "not_available")]
    pub color: String,
    #[serde(default = "not_available")]
    pub condition: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub selling_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_stock: f64,
    #[serde(default = "one", deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default)]
    pub allocated_transport: f64,
    #[serde(default)]
    pub allocated_other: f64,
    #[serde(default)]
    pub allocated_tax: f64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub notes: String,
}

impl LineItem {
    /// 从目录记录生成明细行快照，数量默认 1
    pub fn from_catalog(item: &CatalogItem) -> Self {
        Self {
            product_id: item.item_id.clone(),
            name: item.name.clone(),
            brand: item.brand.clone().unwrap_or_default(),
            size: or_not_available(&item.size),
            color: or_not_available(&item.color),
            condition: or_not_available(&item.item_condition),
            cost_price: item.cost_price,
            selling_price: item.selling_price,
            current_stock: item.stock_quantity,
            quantity: 1.0,
            allocated_transport: 0.0,
            allocated_other: 0.0,
            allocated_tax: 0.0,
            total_cost: 0.0,
            notes: String::new(),
        }
    }

    /// 分摊前小计
    pub fn subtotal(&self) -> f64 {
        self.quantity * self.selling_price
    }

    /// 到岸单价 (含分摊费用)；数量为 0 时无定义
    pub fn final_unit_price(&self) -> Option<f64> {
        if self.quantity == 0.0 {
            None
        } else {
            Some(self.total_cost / self.quantity)
        }
    }
}

/// 批次级费用 (运费、其他费用、税费)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCharges {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub transport: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub other: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tax: f64,
}

impl BatchCharges {
    pub fn new(transport: f64, other: f64, tax: f64) -> Self {
        Self {
            transport,
            other,
            tax,
        }
    }

    /// 表单输入约束: 负数按 0 处理
    pub fn clamped(self) -> Self {
        Self {
            transport: self.transport.max(0.0),
            other: self.other.max(0.0),
            tax: self.tax.max(0.0),
        }
    }

    pub fn total(&self) -> f64 {
        self.transport + self.other + self.tax
    }
}

/// 批次类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchKind {
    StockIn,
    StockOut,
}

impl BatchKind {
    /// 上游库存接口的操作名
    pub fn stock_operation(&self) -> &'static str {
        match self {
            BatchKind::StockIn => "add",
            BatchKind::StockOut => "remove",
        }
    }

    /// 上游交易记录的类型名
    pub fn transaction_type(&self) -> &'static str {
        match self {
            BatchKind::StockIn => "stockIn",
            BatchKind::StockOut => "stockOut",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BatchKind::StockIn => "stock in",
            BatchKind::StockOut => "stock out",
        }
    }
}

/// 批次汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub line_count: usize,
    pub total_quantity: f64,
    pub total_subtotal: f64,
    pub total_allocated_transport: f64,
    pub total_allocated_other: f64,
    pub total_allocated_tax: f64,
    pub total_cost: f64,
    /// 小计为 0 时费用未被分摊 (被丢弃) 的金额
    pub unallocated_charges: f64,
}

fn or_not_available(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn one() -> f64 {
    1.0
}
