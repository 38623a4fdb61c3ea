//! GST arithmetic shared by every tax-bearing record.
//!
//! Exactly one implementation of the inclusive/exclusive formulas lives here;
//! invoice line items, trip revenue, stock consumption and repair assessment
//! all call into it, so the math cannot drift between callers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Base/GST/total split of a monetary amount.
///
/// Invariant: `total == base + gst` in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstBreakdown {
    pub base: Decimal,
    pub gst: Decimal,
    pub total: Decimal,
}

fn ensure_rate(rate_percent: Decimal) -> DomainResult<()> {
    if rate_percent < Decimal::ZERO || rate_percent > Decimal::ONE_HUNDRED {
        return Err(DomainError::validation(format!(
            "gst percentage must be within [0, 100], got {rate_percent}"
        )));
    }
    Ok(())
}

/// Exclusive mode: `base` does not yet contain tax; GST is added on top.
///
/// `gst = base × rate/100`, `total = base + gst`. A zero rate collapses to
/// `gst = 0`, `total = base`.
pub fn add_gst(base: Decimal, rate_percent: Decimal) -> DomainResult<GstBreakdown> {
    ensure_rate(rate_percent)?;
    let gst = base * rate_percent / Decimal::ONE_HUNDRED;
    Ok(GstBreakdown {
        base,
        gst,
        total: base + gst,
    })
}

/// Inclusive mode: `gross` already contains tax; GST is extracted by division,
/// never by multiplying the rate onto the gross.
///
/// `base = gross / (1 + rate/100)`, `gst = gross − base`, `total = gross`.
pub fn extract_gst(gross: Decimal, rate_percent: Decimal) -> DomainResult<GstBreakdown> {
    ensure_rate(rate_percent)?;
    let base = gross / (Decimal::ONE + rate_percent / Decimal::ONE_HUNDRED);
    Ok(GstBreakdown {
        base,
        gst: gross - base,
        total: gross,
    })
}
