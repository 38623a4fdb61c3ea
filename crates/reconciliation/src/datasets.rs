//! Input datasets for a reconciliation run.
//!
//! Heterogeneous, read-only slices of other ledgers (invoices, trips, repairs,
//! stock), already filtered to the reporting period by the caller. The engine
//! never queries storage; everything arrives materialized in memory.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fleetbooks_core::{
    add_gst, BusId, DomainError, DomainResult, ExpenseCategoryId, GstBreakdown, RepairRecordId,
    StockItemId, TripId,
};
use fleetbooks_invoicing::{Invoice, InvoiceDirection, InvoiceStatus};

/// Inclusive reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReconciliationPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation(format!(
                "period end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The slice of an invoice the engine reads: direction, status and the stored
/// GST and total figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFigures {
    pub direction: InvoiceDirection,
    pub status: InvoiceStatus,
    pub gst_amount: Decimal,
    pub total_amount: Decimal,
}

impl InvoiceFigures {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            direction: invoice.direction(),
            status: invoice.status(),
            gst_amount: invoice.totals().gst_amount,
            total_amount: invoice.totals().total_amount,
        }
    }
}

/// Channel-wise revenue for one leg of a trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueBreakdown {
    pub cash: Decimal,
    pub online: Decimal,
    pub paytm: Decimal,
    pub others: Decimal,
    pub agent: Decimal,
}

impl RevenueBreakdown {
    pub fn total(&self) -> Decimal {
        self.cash + self.online + self.paytm + self.others + self.agent
    }
}

/// Completed trip revenue record. Revenue is GST-inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip_id: TripId,
    pub bus_id: Option<BusId>,
    pub outbound: RevenueBreakdown,
    pub return_leg: RevenueBreakdown,
    /// Falls back to the configured default rate when unset.
    pub gst_percentage: Option<Decimal>,
}

impl TripRecord {
    /// Total revenue across both legs and every channel.
    pub fn revenue(&self) -> Decimal {
        self.outbound.total() + self.return_leg.total()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairStatus {
    Submitted,
    Approved,
    Rejected,
}

/// Workshop repair record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRecord {
    pub repair_id: RepairRecordId,
    pub bus_id: Option<BusId>,
    pub parts_cost: Decimal,
    pub labor_cost: Decimal,
    pub gst_applicable: bool,
    pub gst_percentage: Decimal,
    /// Stored at assessment time. A missing value on an applicable record is
    /// degraded to a zero contribution during reconciliation, never a failure.
    pub gst_amount: Option<Decimal>,
    pub status: RepairStatus,
}

impl RepairRecord {
    /// Assess the bill: exclusive-mode GST over parts plus labor when
    /// applicable, plain sum otherwise.
    pub fn assess(&self) -> DomainResult<GstBreakdown> {
        let charges = self.parts_cost + self.labor_cost;
        if !self.gst_applicable {
            return add_gst(charges, Decimal::ZERO);
        }
        add_gst(charges, self.gst_percentage)
    }

    pub fn counts_for_input_gst(&self) -> bool {
        self.status == RepairStatus::Approved && self.gst_applicable
    }
}

/// Stock consumed over the period (fuel, water, spares), priced inclusively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockConsumption {
    pub stock_item_id: StockItemId,
    pub item_name: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub unit_price: Decimal,
    pub gst_percentage: Decimal,
}

impl StockConsumption {
    /// Inclusive value of the consumption.
    pub fn consumed_value(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Expense category tag. Fuel-type category names extend the fuel keyword set
/// used to match stock items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: ExpenseCategoryId,
    pub name: String,
}

/// Everything one reconciliation run consumes. Sources are mutually exclusive
/// by construction; an absent source is simply an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDatasets {
    pub sales_invoices: Vec<InvoiceFigures>,
    pub purchase_invoices: Vec<InvoiceFigures>,
    pub trips: Vec<TripRecord>,
    pub repairs: Vec<RepairRecord>,
    pub stock: Vec<StockConsumption>,
    pub fuel_categories: Vec<ExpenseCategory>,
}
