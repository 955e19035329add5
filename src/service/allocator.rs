use crate::models::{BatchCharges, BatchSummary, LineItem};

/// 按小计比例分摊批次费用
///
/// 每次都从头重算 (幂等)，不做增量修补:
/// - `subtotal_i = quantity_i * sellingPrice_i`
/// - `ratio_i = subtotal_i / Σsubtotal`，批次小计为 0 时所有比例为 0 (费用不分摊)
/// - `allocatedX_i = chargeX * ratio_i`
/// - `totalCost_i = subtotal_i + allocatedTransport_i + allocatedOther_i + allocatedTax_i`
///
/// 负数数量/价格不在此校验，由调用方约束输入。
pub fn allocate(lines: &[LineItem], charges: &BatchCharges) -> Vec<LineItem> {
    let mut out = lines.to_vec();
    allocate_in_place(&mut out, charges);
    out
}

/// 原地重算分摊结果
pub fn allocate_in_place(lines: &mut [LineItem], charges: &BatchCharges) {
    if lines.is_empty() {
        return;
    }

    let total_subtotal: f64 = lines.iter().map(LineItem::subtotal).sum();

    for line in lines.iter_mut() {
        let subtotal = line.subtotal();
        let ratio = if total_subtotal > 0.0 {
            subtotal / total_subtotal
        } else {
            0.0
        };

        line.allocated_transport = charges.transport * ratio;
        line.allocated_other = charges.other * ratio;
        line.allocated_tax = charges.tax * ratio;
        line.total_cost =
            subtotal + line.allocated_transport + line.allocated_other + line.allocated_tax;
    }

    if total_subtotal <= 0.0 && charges.total() != 0.0 {
        tracing::warn!(
            "Batch subtotal is zero, charges of {:.2} were not allocated",
            charges.total()
        );
    }
}

/// 批次汇总 (基于已分摊的明细)
pub fn summarize(lines: &[LineItem], charges: &BatchCharges) -> BatchSummary {
    let total_subtotal: f64 = lines.iter().map(LineItem::subtotal).sum();
    let total_allocated_transport: f64 = lines.iter().map(|l| l.allocated_transport).sum();
    let total_allocated_other: f64 = lines.iter().map(|l| l.allocated_other).sum();
    let total_allocated_tax: f64 = lines.iter().map(|l| l.allocated_tax).sum();

    let unallocated_charges = if total_subtotal > 0.0 {
        0.0
    } else {
        charges.total()
    };

    BatchSummary {
        line_count: lines.len(),
        total_quantity: lines.iter().map(|l| l.quantity).sum(),
        total_subtotal,
        total_allocated_transport,
        total_allocated_other,
        total_allocated_tax,
        total_cost: lines.iter().map(|l| l.total_cost).sum(),
        unallocated_charges,
    }
}
