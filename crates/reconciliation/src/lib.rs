//! GST reconciliation engine.
//!
//! Pure functions over in-memory datasets: heterogeneous ledgers (invoices,
//! trips, repairs, stock) are normalized into one financial-event stream,
//! then reduced into a period's GST position. No IO, no storage queries;
//! callers fetch and pre-filter the datasets.

pub mod config;
pub mod datasets;
pub mod events;
pub mod summary;

pub use config::ReconciliationConfig;
pub use datasets::{
    ExpenseCategory, InvoiceFigures, PeriodDatasets, ReconciliationPeriod, RepairRecord,
    RepairStatus, RevenueBreakdown, StockConsumption, TripRecord,
};
pub use events::{normalize, EventSource, FinancialEvent, Flow};
pub use summary::{reconcile, sum_amount, sum_gst, GstPeriodSummary};
