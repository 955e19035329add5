use crate::models::LineItem;
use crate::service::batch::BatchDraft;
use csv::Writer;

const HEADER: [&str; 15] = [
    "batch_number",
    "product_id",
    "name",
    "brand",
    "size",
    "color",
    "condition",
    "quantity",
    "selling_price",
    "subtotal",
    "allocated_transport",
    "allocated_other",
    "allocated_tax",
    "total_cost",
    "final_unit_price",
];

/// 金额保留两位小数
fn money(v: f64) -> String {
    format!("{:.2}", v)
}

fn unit_price_to_csv(line: &LineItem) -> String {
    line.final_unit_price().map(money).unwrap_or_default()
}

/// 导出草稿的费用分摊明细 (每行一个商品，末尾一行汇总)
pub fn export_batch_csv(draft: &BatchDraft) -> Result<Vec<u8>, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for line in &draft.lines {
        writer.write_record(&[
            draft.batch_number.clone(),
            line.product_id.clone(),
            line.name.clone(),
            line.brand.clone(),
            line.size.clone(),
            line.color.clone(),
            line.condition.clone(),
            line.quantity.to_string(),
            money(line.selling_price),
            money(line.subtotal()),
            money(line.allocated_transport),
            money(line.allocated_other),
            money(line.allocated_tax),
            money(line.total_cost),
            unit_price_to_csv(line),
        ])?;
    }

    let summary = draft.summary();
    writer.write_record(&[
        draft.batch_number.clone(),
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        summary.total_quantity.to_string(),
        String::new(),
        money(summary.total_subtotal),
        money(summary.total_allocated_transport),
        money(summary.total_allocated_other),
        money(summary.total_allocated_tax),
        money(summary.total_cost),
        String::new(),
    ])?;

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
