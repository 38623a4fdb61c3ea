//! Line items and the single calculation turning them into money.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fleetbooks_core::{DomainError, DomainResult, LineItemId, round_currency, tax};

/// One billable or deductible entry on an invoice.
///
/// The derived amounts are never stored independently of [`LineItem::amounts`];
/// re-running the calculation is the only way to obtain them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub gst_percentage: Decimal,
    /// Whether `quantity × unit_price` already contains the tax.
    pub rate_includes_gst: bool,
    /// Deduction lines subtract from the invoice totals (discount, credit note).
    pub is_deduction: bool,
}

impl LineItem {
    /// Reject malformed input before any state change.
    pub fn validate(&self) -> DomainResult<()> {
        if self.description.trim().is_empty() {
            return Err(DomainError::validation(
                "line item description must not be empty",
            ));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "line item quantity must be positive, got {}",
                self.quantity
            )));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "line item unit price must not be negative, got {}",
                self.unit_price
            )));
        }
        if self.gst_percentage < Decimal::ZERO || self.gst_percentage > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(format!(
                "line item gst percentage must be within [0, 100], got {}",
                self.gst_percentage
            )));
        }
        Ok(())
    }

    /// Calculate base/GST/total for this line.
    ///
    /// Inclusive rates extract the tax out of `quantity × unit_price`;
    /// exclusive rates add it on top. Deduction lines calculate the same way;
    /// their sign is applied during aggregation, not here.
    pub fn amounts(&self) -> DomainResult<LineItemAmounts> {
        self.validate()?;

        let raw = self.quantity * self.unit_price;
        let split = if self.rate_includes_gst {
            tax::extract_gst(raw, self.gst_percentage)?
        } else {
            tax::add_gst(raw, self.gst_percentage)?
        };

        Ok(LineItemAmounts {
            base_amount: split.base,
            gst_amount: split.gst,
            total_amount: split.total,
        })
    }
}

/// Calculated amounts for one line, full precision.
///
/// Invariant: `total_amount == base_amount + gst_amount` in both rate modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemAmounts {
    pub base_amount: Decimal,
    pub gst_amount: Decimal,
    pub total_amount: Decimal,
}

impl LineItemAmounts {
    /// 2-dp half-up view for display and export.
    pub fn rounded(&self) -> LineItemAmounts {
        LineItemAmounts {
            base_amount: round_currency(self.base_amount),
            gst_amount: round_currency(self.gst_amount),
            total_amount: round_currency(self.total_amount),
        }
    }
}
