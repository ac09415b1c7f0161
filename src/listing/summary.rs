//! Sales figures over a (filtered) order list

use crate::core::locale::round2;
use crate::entities::OrderRecord;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub count: usize,
    pub total_value: Decimal,
    pub total_paid: Decimal,
    /// Sum of each order's unpaid balance; overpaid orders count as zero
    pub outstanding: Decimal,
    /// Number of orders per status, in order of first appearance
    pub by_status: IndexMap<String, usize>,
}

pub fn summarize(orders: &[OrderRecord]) -> OrderSummary {
    let mut summary = OrderSummary::default();
    for order in orders {
        let doc = &order.document;
        summary.count += 1;
        summary.total_value += doc.total_value;
        summary.total_paid += doc.total_paid;
        summary.outstanding += (doc.total_value - doc.total_paid).max(Decimal::ZERO);
        *summary.by_status.entry(doc.status.clone()).or_insert(0) += 1;
    }
    summary.total_value = round2(summary.total_value);
    summary.total_paid = round2(summary.total_paid);
    summary.outstanding = round2(summary.outstanding);
    summary
}
