//! Normalization of heterogeneous datasets into one financial-event stream.
//!
//! Each source owns its own tax formula here (stored-field sum for invoices
//! and repairs, inclusive extraction for trips and fuel stock); downstream
//! reducers only ever see the common [`FinancialEvent`] shape. Degradable
//! records (missing or out-of-range tax fields) contribute zero GST with a
//! warning instead of failing the whole run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fleetbooks_core::extract_gst;
use fleetbooks_invoicing::{InvoiceDirection, InvoiceStatus};

use crate::config::ReconciliationConfig;
use crate::datasets::{InvoiceFigures, PeriodDatasets, RepairRecord, StockConsumption, TripRecord};

/// Which ledger a normalized event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    SalesInvoice,
    PurchaseInvoice,
    Trip,
    Repair,
    Stock,
}

/// Which side of the tax computation the event lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Revenue,
    Cost,
}

/// One dataset record, normalized. `amount` is the record's gross value and
/// `gst` its tax contribution; reducers slice these by source and flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialEvent {
    pub source: EventSource,
    pub flow: Flow,
    pub amount: Decimal,
    pub gst: Decimal,
}

/// Normalize every dataset into a single event stream.
pub fn normalize(datasets: &PeriodDatasets, config: &ReconciliationConfig) -> Vec<FinancialEvent> {
    let fuel_keywords = fuel_keyword_set(datasets, config);

    let mut events = Vec::new();
    events.extend(
        datasets
            .sales_invoices
            .iter()
            .chain(datasets.purchase_invoices.iter())
            .filter_map(invoice_event),
    );
    events.extend(datasets.trips.iter().map(|trip| trip_event(trip, config)));
    events.extend(datasets.repairs.iter().filter_map(repair_event));
    events.extend(
        datasets
            .stock
            .iter()
            .map(|record| stock_event(record, &fuel_keywords)),
    );
    events
}

/// Configured keywords plus fuel-type expense category names, lowercased.
fn fuel_keyword_set(datasets: &PeriodDatasets, config: &ReconciliationConfig) -> Vec<String> {
    let mut keywords: Vec<String> = config
        .fuel_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect();
    keywords.extend(
        datasets
            .fuel_categories
            .iter()
            .map(|category| category.name.to_lowercase()),
    );
    keywords.retain(|k| !k.is_empty());
    keywords
}

/// Invoices contribute their stored figures; cancelled ones contribute nothing.
fn invoice_event(figures: &InvoiceFigures) -> Option<FinancialEvent> {
    if figures.status == InvoiceStatus::Cancelled {
        return None;
    }
    let (source, flow) = match figures.direction {
        InvoiceDirection::Sales => (EventSource::SalesInvoice, Flow::Revenue),
        InvoiceDirection::Purchase => (EventSource::PurchaseInvoice, Flow::Cost),
    };
    Some(FinancialEvent {
        source,
        flow,
        amount: figures.total_amount,
        gst: figures.gst_amount,
    })
}

/// Trip revenue is GST-inclusive at the trip's rate, default rate when unset.
fn trip_event(trip: &TripRecord, config: &ReconciliationConfig) -> FinancialEvent {
    let revenue = trip.revenue();
    let rate = trip.gst_percentage.unwrap_or(config.default_gst_rate);
    let gst = match extract_gst(revenue, rate) {
        Ok(split) => split.gst,
        Err(err) => {
            tracing::warn!(
                trip_id = %trip.trip_id,
                %rate,
                error = %err,
                "trip rate unusable; counting zero GST for this trip"
            );
            Decimal::ZERO
        }
    };
    FinancialEvent {
        source: EventSource::Trip,
        flow: Flow::Revenue,
        amount: revenue,
        gst,
    }
}

/// Approved, GST-applicable repairs contribute their stored amount. An
/// applicable record with no stored amount is degraded to zero, not failed.
fn repair_event(repair: &RepairRecord) -> Option<FinancialEvent> {
    if !repair.counts_for_input_gst() {
        return None;
    }
    let gst = match repair.gst_amount {
        Some(amount) => amount,
        None => {
            tracing::warn!(
                repair_id = %repair.repair_id,
                "approved GST-applicable repair has no stored gst_amount; counting zero"
            );
            Decimal::ZERO
        }
    };
    Some(FinancialEvent {
        source: EventSource::Repair,
        flow: Flow::Cost,
        amount: repair.parts_cost + repair.labor_cost + gst,
        gst,
    })
}

/// All stock consumption is a cost; only fuel-matched items at a non-zero rate
/// yield GST, extracted from the inclusive consumed value.
fn stock_event(record: &StockConsumption, fuel_keywords: &[String]) -> FinancialEvent {
    let value = record.consumed_value();
    let gst = if is_fuel(record, fuel_keywords) && record.gst_percentage > Decimal::ZERO {
        match extract_gst(value, record.gst_percentage) {
            Ok(split) => split.gst,
            Err(err) => {
                tracing::warn!(
                    stock_item_id = %record.stock_item_id,
                    item_name = %record.item_name,
                    error = %err,
                    "stock rate unusable; counting zero GST for this item"
                );
                Decimal::ZERO
            }
        }
    } else {
        Decimal::ZERO
    };
    FinancialEvent {
        source: EventSource::Stock,
        flow: Flow::Cost,
        amount: value,
        gst,
    }
}

fn is_fuel(record: &StockConsumption, fuel_keywords: &[String]) -> bool {
    let name = record.item_name.to_lowercase();
    fuel_keywords.iter().any(|keyword| name.contains(keyword))
}
