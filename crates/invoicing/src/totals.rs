//! Deduction-aware aggregation of line items into invoice totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fleetbooks_core::{DomainResult, round_currency};

use crate::line_item::LineItem;

/// Invoice-level sums over calculated line items, full precision.
///
/// Invariant: `total_amount == subtotal + gst_amount`. Negative totals are
/// legal (an all-deduction invoice is a credit) and are surfaced as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub gst_amount: Decimal,
    pub total_amount: Decimal,
    /// Gross value of the deduction lines (base + GST), reported separately
    /// for display and audit; always non-negative.
    pub deductions_total: Decimal,
}

impl InvoiceTotals {
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            gst_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            deductions_total: Decimal::ZERO,
        }
    }

    /// 2-dp half-up view for display and export.
    pub fn rounded(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: round_currency(self.subtotal),
            gst_amount: round_currency(self.gst_amount),
            total_amount: round_currency(self.total_amount),
            deductions_total: round_currency(self.deductions_total),
        }
    }
}

/// Sum a set of line items into invoice totals.
///
/// Regular lines add their base and GST; deduction lines subtract both. The
/// whole set is validated up front; one malformed line fails the aggregation
/// before anything is summed.
pub fn aggregate(items: &[LineItem]) -> DomainResult<InvoiceTotals> {
    let mut subtotal = Decimal::ZERO;
    let mut gst_amount = Decimal::ZERO;
    let mut deductions_total = Decimal::ZERO;

    for item in items {
        let amounts = item.amounts()?;
        if item.is_deduction {
            subtotal -= amounts.base_amount;
            gst_amount -= amounts.gst_amount;
            deductions_total += amounts.base_amount + amounts.gst_amount;
        } else {
            subtotal += amounts.base_amount;
            gst_amount += amounts.gst_amount;
        }
    }

    Ok(InvoiceTotals {
        subtotal,
        gst_amount,
        total_amount: subtotal + gst_amount,
        deductions_total,
    })
}
