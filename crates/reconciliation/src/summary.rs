//! GST period summary: reducers folding the event stream into a report.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fleetbooks_core::round_currency;

use crate::config::ReconciliationConfig;
use crate::datasets::{PeriodDatasets, ReconciliationPeriod};
use crate::events::{normalize, EventSource, FinancialEvent, Flow};

/// GST position for one reporting period. Computed, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstPeriodSummary {
    pub period: ReconciliationPeriod,
    pub sales_invoice_gst: Decimal,
    pub trip_gst: Decimal,
    /// Tax collected: `sales_invoice_gst + trip_gst`.
    pub output_gst: Decimal,
    pub purchase_invoice_gst: Decimal,
    pub repair_gst: Decimal,
    pub stock_gst: Decimal,
    /// Tax paid: `purchase_invoice_gst + repair_gst + stock_gst`.
    pub input_gst: Decimal,
    /// `output_gst - input_gst`; positive is payable, negative a carried credit.
    pub net_gst: Decimal,
    /// Sales invoice totals plus trip revenue, for ratio reporting only.
    pub total_revenue: Decimal,
}

impl GstPeriodSummary {
    /// Fold a normalized event stream into the summary.
    pub fn from_events(period: ReconciliationPeriod, events: &[FinancialEvent]) -> Self {
        let sales_invoice_gst = sum_gst(events, EventSource::SalesInvoice);
        let trip_gst = sum_gst(events, EventSource::Trip);
        let purchase_invoice_gst = sum_gst(events, EventSource::PurchaseInvoice);
        let repair_gst = sum_gst(events, EventSource::Repair);
        let stock_gst = sum_gst(events, EventSource::Stock);

        let output_gst = sales_invoice_gst + trip_gst;
        let input_gst = purchase_invoice_gst + repair_gst + stock_gst;

        Self {
            period,
            sales_invoice_gst,
            trip_gst,
            output_gst,
            purchase_invoice_gst,
            repair_gst,
            stock_gst,
            input_gst,
            net_gst: output_gst - input_gst,
            total_revenue: sum_amount(events, Flow::Revenue),
        }
    }

    pub fn is_payable(&self) -> bool {
        self.net_gst > Decimal::ZERO
    }

    /// 2-dp half-up view for reporting.
    pub fn rounded(&self) -> Self {
        Self {
            period: self.period,
            sales_invoice_gst: round_currency(self.sales_invoice_gst),
            trip_gst: round_currency(self.trip_gst),
            output_gst: round_currency(self.output_gst),
            purchase_invoice_gst: round_currency(self.purchase_invoice_gst),
            repair_gst: round_currency(self.repair_gst),
            stock_gst: round_currency(self.stock_gst),
            input_gst: round_currency(self.input_gst),
            net_gst: round_currency(self.net_gst),
            total_revenue: round_currency(self.total_revenue),
        }
    }
}

/// Reducer: one source's GST total.
pub fn sum_gst(events: &[FinancialEvent], source: EventSource) -> Decimal {
    events
        .iter()
        .filter(|event| event.source == source)
        .map(|event| event.gst)
        .sum()
}

/// Reducer: one flow's gross amount total.
pub fn sum_amount(events: &[FinancialEvent], flow: Flow) -> Decimal {
    events
        .iter()
        .filter(|event| event.flow == flow)
        .map(|event| event.amount)
        .sum()
}

/// Reconcile one period's datasets into a GST summary.
///
/// Pure over its inputs; absent source categories contribute zero. Datasets
/// must already be filtered to the period and partitioned without overlap.
pub fn reconcile(
    period: ReconciliationPeriod,
    datasets: &PeriodDatasets,
    config: &ReconciliationConfig,
) -> GstPeriodSummary {
    let events = normalize(datasets, config);
    let summary = GstPeriodSummary::from_events(period, &events);
    tracing::debug!(
        start = %period.start,
        end = %period.end,
        events = events.len(),
        output_gst = %summary.output_gst,
        input_gst = %summary.input_gst,
        net_gst = %summary.net_gst,
        "reconciled GST period"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::{
        InvoiceFigures, RepairRecord, RepairStatus, RevenueBreakdown, StockConsumption, TripRecord,
    };
    use chrono::NaiveDate;
    use fleetbooks_core::{RepairRecordId, StockItemId, TripId};
    use fleetbooks_invoicing::{InvoiceDirection, InvoiceStatus};
    use rust_decimal_macros::dec;

    fn august_2025() -> ReconciliationPeriod {
        ReconciliationPeriod::new(
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
        )
        .unwrap()
    }

    fn figures(
        direction: InvoiceDirection,
        status: InvoiceStatus,
        gst: Decimal,
        total: Decimal,
    ) -> InvoiceFigures {
        InvoiceFigures {
            direction,
            status,
            gst_amount: gst,
            total_amount: total,
        }
    }

    fn trip(revenue: Decimal, rate: Option<Decimal>) -> TripRecord {
        TripRecord {
            trip_id: TripId::new(),
            bus_id: None,
            outbound: RevenueBreakdown {
                cash: revenue,
                ..RevenueBreakdown::default()
            },
            return_leg: RevenueBreakdown::default(),
            gst_percentage: rate,
        }
    }

    fn approved_repair(gst: Decimal) -> RepairRecord {
        RepairRecord {
            repair_id: RepairRecordId::new(),
            bus_id: None,
            parts_cost: dec!(400),
            labor_cost: dec!(100),
            gst_applicable: true,
            gst_percentage: dec!(18),
            gst_amount: Some(gst),
            status: RepairStatus::Approved,
        }
    }

    fn diesel(quantity: Decimal, unit_price: Decimal) -> StockConsumption {
        StockConsumption {
            stock_item_id: StockItemId::new(),
            item_name: "Diesel".to_string(),
            quantity,
            unit: Some("litre".to_string()),
            unit_price,
            gst_percentage: dec!(18),
        }
    }

    #[test]
    fn period_with_every_output_and_input_source() {
        // One sales invoice carrying GST 180, one trip of 2360 inclusive at
        // the default 18% (GST 360), one approved repair with GST 90.
        let datasets = PeriodDatasets {
            sales_invoices: vec![figures(
                InvoiceDirection::Sales,
                InvoiceStatus::Paid,
                dec!(180),
                dec!(1180),
            )],
            trips: vec![trip(dec!(2360), None)],
            repairs: vec![approved_repair(dec!(90))],
            ..PeriodDatasets::default()
        };

        let summary = reconcile(august_2025(), &datasets, &ReconciliationConfig::default());

        assert_eq!(summary.sales_invoice_gst, dec!(180));
        assert_eq!(summary.trip_gst, dec!(360));
        assert_eq!(summary.output_gst, dec!(540));
        assert_eq!(summary.purchase_invoice_gst, Decimal::ZERO);
        assert_eq!(summary.repair_gst, dec!(90));
        assert_eq!(summary.stock_gst, Decimal::ZERO);
        assert_eq!(summary.input_gst, dec!(90));
        assert_eq!(summary.net_gst, dec!(450));
        assert!(summary.is_payable());
        assert_eq!(summary.total_revenue, dec!(3540));
    }

    #[test]
    fn empty_period_reconciles_to_zero() {
        let summary = reconcile(
            august_2025(),
            &PeriodDatasets::default(),
            &ReconciliationConfig::default(),
        );
        assert_eq!(summary.output_gst, Decimal::ZERO);
        assert_eq!(summary.input_gst, Decimal::ZERO);
        assert_eq!(summary.net_gst, Decimal::ZERO);
        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert!(!summary.is_payable());
    }

    #[test]
    fn cancelled_invoices_never_reach_the_summary() {
        let datasets = PeriodDatasets {
            sales_invoices: vec![
                figures(
                    InvoiceDirection::Sales,
                    InvoiceStatus::Sent,
                    dec!(36),
                    dec!(236),
                ),
                figures(
                    InvoiceDirection::Sales,
                    InvoiceStatus::Cancelled,
                    dec!(900),
                    dec!(5900),
                ),
            ],
            purchase_invoices: vec![figures(
                InvoiceDirection::Purchase,
                InvoiceStatus::Cancelled,
                dec!(54),
                dec!(354),
            )],
            ..PeriodDatasets::default()
        };

        let summary = reconcile(august_2025(), &datasets, &ReconciliationConfig::default());
        assert_eq!(summary.sales_invoice_gst, dec!(36));
        assert_eq!(summary.purchase_invoice_gst, Decimal::ZERO);
        assert_eq!(summary.total_revenue, dec!(236));
    }

    #[test]
    fn input_heavy_period_is_a_carried_credit() {
        let datasets = PeriodDatasets {
            purchase_invoices: vec![figures(
                InvoiceDirection::Purchase,
                InvoiceStatus::Paid,
                dec!(500),
                dec!(3278),
            )],
            sales_invoices: vec![figures(
                InvoiceDirection::Sales,
                InvoiceStatus::Paid,
                dec!(120),
                dec!(787),
            )],
            ..PeriodDatasets::default()
        };

        let summary = reconcile(august_2025(), &datasets, &ReconciliationConfig::default());
        assert_eq!(summary.net_gst, dec!(-380));
        assert!(!summary.is_payable());
    }

    #[test]
    fn fuel_stock_feeds_input_gst() {
        let datasets = PeriodDatasets {
            stock: vec![diesel(dec!(100), dec!(11.80))],
            ..PeriodDatasets::default()
        };

        let summary = reconcile(august_2025(), &datasets, &ReconciliationConfig::default());
        assert_eq!(summary.stock_gst, dec!(180));
        assert_eq!(summary.input_gst, dec!(180));
        assert_eq!(summary.net_gst, dec!(-180));
    }

    #[test]
    fn rounded_view_settles_on_two_decimals() {
        // Trip of 100 at 18%: GST 15.254237...; the report shows 15.25.
        let datasets = PeriodDatasets {
            trips: vec![trip(dec!(100), None)],
            ..PeriodDatasets::default()
        };

        let summary = reconcile(august_2025(), &datasets, &ReconciliationConfig::default());
        let rounded = summary.rounded();
        assert_eq!(rounded.trip_gst, dec!(15.25));
        assert_eq!(rounded.output_gst, dec!(15.25));
        assert_eq!(rounded.net_gst, dec!(15.25));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_money() -> impl Strategy<Value = Decimal> {
            (0i64..=5_000_000).prop_map(|cents| Decimal::new(cents, 2))
        }

        fn arb_status() -> impl Strategy<Value = InvoiceStatus> {
            prop::sample::select(vec![
                InvoiceStatus::Draft,
                InvoiceStatus::Sent,
                InvoiceStatus::Partial,
                InvoiceStatus::Paid,
                InvoiceStatus::Overdue,
                InvoiceStatus::Cancelled,
            ])
        }

        fn arb_figures(direction: InvoiceDirection) -> impl Strategy<Value = InvoiceFigures> {
            (arb_money(), arb_money(), arb_status()).prop_map(move |(gst, total, status)| {
                InvoiceFigures {
                    direction,
                    status,
                    gst_amount: gst,
                    total_amount: total,
                }
            })
        }

        fn arb_rate() -> impl Strategy<Value = Decimal> {
            (0i64..=2800).prop_map(|bp| Decimal::new(bp, 2))
        }

        fn arb_trip() -> impl Strategy<Value = TripRecord> {
            (arb_money(), proptest::option::of(arb_rate())).prop_map(|(cash, rate)| TripRecord {
                trip_id: TripId::new(),
                bus_id: None,
                outbound: RevenueBreakdown {
                    cash,
                    ..RevenueBreakdown::default()
                },
                return_leg: RevenueBreakdown::default(),
                gst_percentage: rate,
            })
        }

        fn arb_repair() -> impl Strategy<Value = RepairRecord> {
            (
                arb_money(),
                arb_money(),
                any::<bool>(),
                proptest::option::of(arb_money()),
                prop::sample::select(vec![
                    RepairStatus::Submitted,
                    RepairStatus::Approved,
                    RepairStatus::Rejected,
                ]),
            )
                .prop_map(|(parts, labor, applicable, gst, status)| RepairRecord {
                    repair_id: RepairRecordId::new(),
                    bus_id: None,
                    parts_cost: parts,
                    labor_cost: labor,
                    gst_applicable: applicable,
                    gst_percentage: dec!(18),
                    gst_amount: gst,
                    status,
                })
        }

        fn arb_stock() -> impl Strategy<Value = StockConsumption> {
            (
                prop::sample::select(vec!["Diesel", "Petrol", "Engine Oil", "Water Can"]),
                1i64..=1000,
                arb_money(),
                prop::sample::select(vec![Decimal::ZERO, Decimal::from(5), Decimal::from(18)]),
            )
                .prop_map(|(name, quantity, unit_price, rate)| StockConsumption {
                    stock_item_id: StockItemId::new(),
                    item_name: name.to_string(),
                    quantity: Decimal::from(quantity),
                    unit: None,
                    unit_price,
                    gst_percentage: rate,
                })
        }

        fn arb_datasets() -> impl Strategy<Value = PeriodDatasets> {
            (
                prop::collection::vec(arb_figures(InvoiceDirection::Sales), 0..6),
                prop::collection::vec(arb_figures(InvoiceDirection::Purchase), 0..6),
                prop::collection::vec(arb_trip(), 0..6),
                prop::collection::vec(arb_repair(), 0..6),
                prop::collection::vec(arb_stock(), 0..6),
            )
                .prop_map(
                    |(sales_invoices, purchase_invoices, trips, repairs, stock)| PeriodDatasets {
                        sales_invoices,
                        purchase_invoices,
                        trips,
                        repairs,
                        stock,
                        fuel_categories: vec![],
                    },
                )
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// The component identities hold for any dataset mix, and the
            /// engine is deterministic over its inputs.
            #[test]
            fn summary_components_always_reconcile(datasets in arb_datasets()) {
                let period = august_2025();
                let config = ReconciliationConfig::default();
                let summary = reconcile(period, &datasets, &config);

                prop_assert_eq!(
                    summary.output_gst,
                    summary.sales_invoice_gst + summary.trip_gst
                );
                prop_assert_eq!(
                    summary.input_gst,
                    summary.purchase_invoice_gst + summary.repair_gst + summary.stock_gst
                );
                prop_assert_eq!(summary.net_gst, summary.output_gst - summary.input_gst);

                let expected_revenue: Decimal = datasets
                    .sales_invoices
                    .iter()
                    .filter(|f| f.status != InvoiceStatus::Cancelled)
                    .map(|f| f.total_amount)
                    .sum::<Decimal>()
                    + datasets.trips.iter().map(|t| t.revenue()).sum::<Decimal>();
                prop_assert_eq!(summary.total_revenue, expected_revenue);

                prop_assert_eq!(summary, reconcile(period, &datasets, &config));
            }

            /// Removing a source category zeroes its component and nothing else.
            #[test]
            fn absent_sources_contribute_zero(datasets in arb_datasets()) {
                let period = august_2025();
                let config = ReconciliationConfig::default();

                let mut without_trips = datasets.clone();
                without_trips.trips.clear();
                let summary = reconcile(period, &without_trips, &config);
                prop_assert_eq!(summary.trip_gst, Decimal::ZERO);

                let mut without_inputs = datasets;
                without_inputs.purchase_invoices.clear();
                without_inputs.repairs.clear();
                without_inputs.stock.clear();
                let summary = reconcile(period, &without_inputs, &config);
                prop_assert_eq!(summary.input_gst, Decimal::ZERO);
                prop_assert_eq!(summary.net_gst, summary.output_gst);
            }
        }
    }
}
