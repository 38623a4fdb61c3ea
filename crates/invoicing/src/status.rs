//! Invoice lifecycle state machine.
//!
//! Every status change in the system goes through [`transition`]; nothing else
//! assigns a status. `partial`/`paid` derive from the payment ledger, while
//! `sent`, `overdue` and `cancelled` record explicit user or scheduler actions
//! that cannot be recomputed from the ledger and are kept as explicit state.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fleetbooks_core::{DomainError, DomainResult};

/// Invoice lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal with respect to payment application: settled and cancelled
    /// invoices reject further payments.
    pub fn accepts_payments(self) -> bool {
        !matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is asking the status to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTrigger {
    /// Explicit user action: the invoice was issued to the counterparty.
    Send,
    /// A payment was applied; the next state derives from the ledger.
    PaymentApplied,
    /// External scheduler signal. The core validates legality only; it never
    /// polls time itself.
    DueDatePassed { as_of: NaiveDate },
    /// Explicit user action; terminal.
    Cancel,
}

/// Ledger figures the machine derives payment states from.
#[derive(Debug, Clone, Copy)]
pub struct LedgerView {
    pub amount_paid: Decimal,
    pub total_amount: Decimal,
    pub due_date: Option<NaiveDate>,
}

impl LedgerView {
    pub fn balance_due(&self) -> Decimal {
        self.total_amount - self.amount_paid
    }
}

/// The single authoritative transition function.
///
/// For [`StatusTrigger::PaymentApplied`] the ledger must already reflect the
/// payment being applied; the current status is only used to check that the
/// invoice still accepts payments.
pub fn transition(
    current: InvoiceStatus,
    trigger: StatusTrigger,
    ledger: LedgerView,
) -> DomainResult<InvoiceStatus> {
    match trigger {
        StatusTrigger::Send => match current {
            InvoiceStatus::Draft => Ok(InvoiceStatus::Sent),
            other => Err(DomainError::invalid_state(format!(
                "cannot send an invoice in status {other}"
            ))),
        },

        StatusTrigger::PaymentApplied => {
            if !current.accepts_payments() {
                return Err(DomainError::invalid_state(format!(
                    "cannot apply a payment to an invoice in status {current}"
                )));
            }
            Ok(payment_status(ledger))
        }

        StatusTrigger::DueDatePassed { as_of } => match current {
            InvoiceStatus::Draft | InvoiceStatus::Sent | InvoiceStatus::Partial => {
                let due_date = ledger.due_date.ok_or_else(|| {
                    DomainError::invalid_state("invoice has no due date to pass")
                })?;
                if due_date >= as_of {
                    return Err(DomainError::invalid_state(format!(
                        "due date {due_date} has not passed as of {as_of}"
                    )));
                }
                if ledger.balance_due() <= Decimal::ZERO {
                    return Err(DomainError::invalid_state(
                        "nothing outstanding; invoice cannot become overdue",
                    ));
                }
                Ok(InvoiceStatus::Overdue)
            }
            other => Err(DomainError::invalid_state(format!(
                "cannot mark an invoice overdue in status {other}"
            ))),
        },

        StatusTrigger::Cancel => match current {
            InvoiceStatus::Draft
            | InvoiceStatus::Sent
            | InvoiceStatus::Partial
            | InvoiceStatus::Overdue => Ok(InvoiceStatus::Cancelled),
            other => Err(DomainError::invalid_state(format!(
                "cannot cancel an invoice in status {other}"
            ))),
        },
    }
}

/// Status after the invoice's totals changed (line-item replacement).
///
/// With payments on the books the partial/paid split is re-derived against the
/// new totals; without payments the explicit status (draft/sent/overdue)
/// carries information the ledger cannot recompute and is kept.
pub fn after_totals_change(current: InvoiceStatus, ledger: LedgerView) -> InvoiceStatus {
    if ledger.amount_paid > Decimal::ZERO {
        payment_status(ledger)
    } else {
        current
    }
}

fn payment_status(ledger: LedgerView) -> InvoiceStatus {
    if ledger.balance_due() <= Decimal::ZERO {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const ALL: [InvoiceStatus; 6] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Partial,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled,
    ];

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger(amount_paid: Decimal, total_amount: Decimal) -> LedgerView {
        LedgerView {
            amount_paid,
            total_amount,
            due_date: Some(date(2025, 8, 1)),
        }
    }

    #[test]
    fn send_is_legal_from_draft_only() {
        let view = ledger(Decimal::ZERO, dec!(1000));
        assert_eq!(
            transition(InvoiceStatus::Draft, StatusTrigger::Send, view).unwrap(),
            InvoiceStatus::Sent
        );

        for status in ALL.into_iter().filter(|s| *s != InvoiceStatus::Draft) {
            let err = transition(status, StatusTrigger::Send, view).unwrap_err();
            assert!(matches!(err, DomainError::InvalidState(_)));
        }
    }

    #[test]
    fn payments_derive_partial_then_paid() {
        let partial = transition(
            InvoiceStatus::Sent,
            StatusTrigger::PaymentApplied,
            ledger(dec!(400), dec!(1000)),
        )
        .unwrap();
        assert_eq!(partial, InvoiceStatus::Partial);

        let paid = transition(
            InvoiceStatus::Partial,
            StatusTrigger::PaymentApplied,
            ledger(dec!(1000), dec!(1000)),
        )
        .unwrap();
        assert_eq!(paid, InvoiceStatus::Paid);

        // Overpayment crosses straight to paid.
        let credited = transition(
            InvoiceStatus::Overdue,
            StatusTrigger::PaymentApplied,
            ledger(dec!(1200), dec!(1000)),
        )
        .unwrap();
        assert_eq!(credited, InvoiceStatus::Paid);
    }

    #[test]
    fn settled_and_cancelled_invoices_reject_payments() {
        for status in [InvoiceStatus::Paid, InvoiceStatus::Cancelled] {
            let err = transition(
                status,
                StatusTrigger::PaymentApplied,
                ledger(dec!(100), dec!(1000)),
            )
            .unwrap_err();
            match err {
                DomainError::InvalidState(msg) if msg.contains("cannot apply a payment") => {}
                other => panic!("expected InvalidState, got {other:?}"),
            }
        }
    }

    #[test]
    fn overdue_needs_a_passed_due_date_and_an_outstanding_balance() {
        let as_of = StatusTrigger::DueDatePassed {
            as_of: date(2025, 8, 23),
        };

        assert_eq!(
            transition(InvoiceStatus::Sent, as_of, ledger(dec!(100), dec!(1000))).unwrap(),
            InvoiceStatus::Overdue
        );

        // Due today is not overdue yet.
        let not_passed = StatusTrigger::DueDatePassed {
            as_of: date(2025, 8, 1),
        };
        assert!(transition(InvoiceStatus::Sent, not_passed, ledger(dec!(100), dec!(1000))).is_err());

        // No due date at all.
        let mut undated = ledger(dec!(100), dec!(1000));
        undated.due_date = None;
        assert!(transition(InvoiceStatus::Sent, as_of, undated).is_err());

        // Nothing outstanding.
        assert!(transition(InvoiceStatus::Sent, as_of, ledger(dec!(1000), dec!(1000))).is_err());

        // Only draft/sent/partial can be flagged.
        for status in [
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
            InvoiceStatus::Cancelled,
        ] {
            assert!(transition(status, as_of, ledger(dec!(100), dec!(1000))).is_err());
        }
    }

    #[test]
    fn cancel_is_terminal_and_unavailable_once_settled() {
        let view = ledger(dec!(100), dec!(1000));

        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Partial,
            InvoiceStatus::Overdue,
        ] {
            assert_eq!(
                transition(status, StatusTrigger::Cancel, view).unwrap(),
                InvoiceStatus::Cancelled
            );
        }

        for status in [InvoiceStatus::Paid, InvoiceStatus::Cancelled] {
            assert!(transition(status, StatusTrigger::Cancel, view).is_err());
        }
    }

    #[test]
    fn totals_change_rederives_only_when_something_was_paid() {
        // Unpaid: the explicit status is information, keep it.
        assert_eq!(
            after_totals_change(InvoiceStatus::Sent, ledger(Decimal::ZERO, dec!(500))),
            InvoiceStatus::Sent
        );

        // Paid 400 against new smaller total 300: now settled.
        assert_eq!(
            after_totals_change(InvoiceStatus::Partial, ledger(dec!(400), dec!(300))),
            InvoiceStatus::Paid
        );

        // Paid 400 against new larger total 900: back to partial.
        assert_eq!(
            after_totals_change(InvoiceStatus::Paid, ledger(dec!(400), dec!(900))),
            InvoiceStatus::Partial
        );
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::Overdue).unwrap(),
            "\"overdue\""
        );
        let back: InvoiceStatus = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(back, InvoiceStatus::Partial);
    }
}
