//! `fleetbooks-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, typed identifiers, aggregate/event contracts, and the
//! single shared implementation of GST arithmetic.

pub mod aggregate;
pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod tax;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::{
    AggregateId, BusId, ExpenseCategoryId, LineItemId, PaymentId, RepairRecordId, StockItemId,
    TripId,
};
pub use money::round_currency;
pub use tax::{GstBreakdown, add_gst, extract_gst};
