//! Invoice aggregate: header, line items, payment ledger and status.
//!
//! Totals are never patched directly. Replacing the line-item set is the only
//! way to change them, and every replacement recomputes totals from scratch
//! and re-derives the payment status against the existing ledger.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fleetbooks_core::{
    Aggregate, AggregateId, AggregateRoot, BusId, DomainError, Event, TripId,
};
use fleetbooks_numbering::DocumentNumber;

use crate::line_item::LineItem;
use crate::payment::Payment;
use crate::status::{self, InvoiceStatus, LedgerView, StatusTrigger};
use crate::totals::{self, InvoiceTotals};

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Which side of the books the invoice sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceDirection {
    Sales,
    Purchase,
}

impl InvoiceDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceDirection::Sales => "sales",
            InvoiceDirection::Purchase => "purchase",
        }
    }
}

/// Business channel the invoice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    Customer,
    OnlineApp,
    Charter,
}

impl InvoiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceKind::Customer => "customer",
            InvoiceKind::OnlineApp => "online_app",
            InvoiceKind::Charter => "charter",
        }
    }
}

/// The party billed (sales) or billing us (purchase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub name: String,
    pub contact: Option<String>,
    pub address: Option<String>,
}

/// Aggregate root: Invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: Option<DocumentNumber>,
    direction: InvoiceDirection,
    kind: InvoiceKind,
    category: Option<String>,
    counterparty: Option<Counterparty>,
    trip_id: Option<TripId>,
    bus_id: Option<BusId>,
    invoice_date: NaiveDate,
    due_date: Option<NaiveDate>,
    notes: Option<String>,
    terms: Option<String>,
    status: InvoiceStatus,
    line_items: Vec<LineItem>,
    totals: InvoiceTotals,
    payments: Vec<Payment>,
    amount_paid: Decimal,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            invoice_number: None,
            direction: InvoiceDirection::Sales,
            kind: InvoiceKind::Customer,
            category: None,
            counterparty: None,
            trip_id: None,
            bus_id: None,
            invoice_date: NaiveDate::default(),
            due_date: None,
            notes: None,
            terms: None,
            status: InvoiceStatus::Draft,
            line_items: Vec::new(),
            totals: InvoiceTotals::zero(),
            payments: Vec::new(),
            amount_paid: Decimal::ZERO,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn invoice_number(&self) -> Option<DocumentNumber> {
        self.invoice_number
    }

    pub fn direction(&self) -> InvoiceDirection {
        self.direction
    }

    pub fn kind(&self) -> InvoiceKind {
        self.kind
    }

    pub fn counterparty(&self) -> Option<&Counterparty> {
        self.counterparty.as_ref()
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn totals(&self) -> InvoiceTotals {
        self.totals
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    /// Outstanding amount. Negative once overpaid (counterparty credit).
    pub fn balance_due(&self) -> Decimal {
        self.totals.total_amount - self.amount_paid
    }

    pub fn can_accept_payment(&self) -> bool {
        self.created && self.status.accepts_payments()
    }

    fn ledger_view(&self) -> LedgerView {
        LedgerView {
            amount_paid: self.amount_paid,
            total_amount: self.totals.total_amount,
            due_date: self.due_date,
        }
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenInvoice. The document number is allocated by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInvoice {
    pub invoice_id: InvoiceId,
    pub invoice_number: DocumentNumber,
    pub direction: InvoiceDirection,
    pub kind: InvoiceKind,
    pub category: Option<String>,
    pub counterparty: Option<Counterparty>,
    pub trip_id: Option<TripId>,
    pub bus_id: Option<BusId>,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub line_items: Vec<LineItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReplaceLineItems. Atomic swap of the whole line-item set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceLineItems {
    pub invoice_id: InvoiceId,
    pub line_items: Vec<LineItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordPayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub invoice_id: InvoiceId,
    pub payment: Payment,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkSent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkSent {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkOverdue. Issued by an external scheduler with its clock date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkOverdue {
    pub invoice_id: InvoiceId,
    pub as_of: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelInvoice {
    pub invoice_id: InvoiceId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    OpenInvoice(OpenInvoice),
    ReplaceLineItems(ReplaceLineItems),
    RecordPayment(RecordPayment),
    MarkSent(MarkSent),
    MarkOverdue(MarkOverdue),
    CancelInvoice(CancelInvoice),
}

/// Event: InvoiceOpened. Carries the totals computed at open time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceOpened {
    pub invoice_id: InvoiceId,
    pub invoice_number: DocumentNumber,
    pub direction: InvoiceDirection,
    pub kind: InvoiceKind,
    pub category: Option<String>,
    pub counterparty: Option<Counterparty>,
    pub trip_id: Option<TripId>,
    pub bus_id: Option<BusId>,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub line_items: Vec<LineItem>,
    pub totals: InvoiceTotals,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineItemsReplaced. Totals and status are the post-swap values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemsReplaced {
    pub invoice_id: InvoiceId,
    pub line_items: Vec<LineItem>,
    pub totals: InvoiceTotals,
    pub status: InvoiceStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentRecorded. Carries the ledger figures after this payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub invoice_id: InvoiceId,
    pub payment: Payment,
    pub amount_paid: Decimal,
    pub balance_due: Decimal,
    pub status: InvoiceStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceSent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSent {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceOverdue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceOverdue {
    pub invoice_id: InvoiceId,
    pub as_of: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCancelled {
    pub invoice_id: InvoiceId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceOpened(InvoiceOpened),
    LineItemsReplaced(LineItemsReplaced),
    PaymentRecorded(PaymentRecorded),
    InvoiceSent(InvoiceSent),
    InvoiceOverdue(InvoiceOverdue),
    InvoiceCancelled(InvoiceCancelled),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceOpened(_) => "invoicing.invoice.opened",
            InvoiceEvent::LineItemsReplaced(_) => "invoicing.invoice.line_items_replaced",
            InvoiceEvent::PaymentRecorded(_) => "invoicing.invoice.payment_recorded",
            InvoiceEvent::InvoiceSent(_) => "invoicing.invoice.sent",
            InvoiceEvent::InvoiceOverdue(_) => "invoicing.invoice.overdue",
            InvoiceEvent::InvoiceCancelled(_) => "invoicing.invoice.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceOpened(e) => e.occurred_at,
            InvoiceEvent::LineItemsReplaced(e) => e.occurred_at,
            InvoiceEvent::PaymentRecorded(e) => e.occurred_at,
            InvoiceEvent::InvoiceSent(e) => e.occurred_at,
            InvoiceEvent::InvoiceOverdue(e) => e.occurred_at,
            InvoiceEvent::InvoiceCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceOpened(e) => {
                self.id = e.invoice_id;
                self.invoice_number = Some(e.invoice_number);
                self.direction = e.direction;
                self.kind = e.kind;
                self.category = e.category.clone();
                self.counterparty = e.counterparty.clone();
                self.trip_id = e.trip_id;
                self.bus_id = e.bus_id;
                self.invoice_date = e.invoice_date;
                self.due_date = e.due_date;
                self.notes = e.notes.clone();
                self.terms = e.terms.clone();
                self.status = InvoiceStatus::Draft;
                self.line_items = e.line_items.clone();
                self.totals = e.totals;
                self.payments.clear();
                self.amount_paid = Decimal::ZERO;
                self.created = true;
            }
            InvoiceEvent::LineItemsReplaced(e) => {
                self.line_items = e.line_items.clone();
                self.totals = e.totals;
                self.status = e.status;
            }
            InvoiceEvent::PaymentRecorded(e) => {
                self.payments.push(e.payment.clone());
                self.amount_paid = e.amount_paid;
                self.status = e.status;
            }
            InvoiceEvent::InvoiceSent(_) => {
                self.status = InvoiceStatus::Sent;
            }
            InvoiceEvent::InvoiceOverdue(_) => {
                self.status = InvoiceStatus::Overdue;
            }
            InvoiceEvent::InvoiceCancelled(_) => {
                self.status = InvoiceStatus::Cancelled;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::OpenInvoice(cmd) => self.handle_open(cmd),
            InvoiceCommand::ReplaceLineItems(cmd) => self.handle_replace_line_items(cmd),
            InvoiceCommand::RecordPayment(cmd) => self.handle_record_payment(cmd),
            InvoiceCommand::MarkSent(cmd) => self.handle_mark_sent(cmd),
            InvoiceCommand::MarkOverdue(cmd) => self.handle_mark_overdue(cmd),
            InvoiceCommand::CancelInvoice(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl Invoice {
    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn ensure_invoice_id(&self, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if self.id != invoice_id {
            return Err(DomainError::validation("invoice_id mismatch"));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }

        if let Some(party) = &cmd.counterparty {
            if party.name.trim().is_empty() {
                return Err(DomainError::validation(
                    "counterparty name must not be empty",
                ));
            }
        }

        // An empty line-item set is a legal draft; each present line must
        // still be well formed.
        let totals = totals::aggregate(&cmd.line_items)?;

        Ok(vec![InvoiceEvent::InvoiceOpened(InvoiceOpened {
            invoice_id: cmd.invoice_id,
            invoice_number: cmd.invoice_number,
            direction: cmd.direction,
            kind: cmd.kind,
            category: cmd.category.clone(),
            counterparty: cmd.counterparty.clone(),
            trip_id: cmd.trip_id,
            bus_id: cmd.bus_id,
            invoice_date: cmd.invoice_date,
            due_date: cmd.due_date,
            notes: cmd.notes.clone(),
            terms: cmd.terms.clone(),
            line_items: cmd.line_items.clone(),
            totals,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_replace_line_items(
        &self,
        cmd: &ReplaceLineItems,
    ) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        if self.status == InvoiceStatus::Cancelled {
            return Err(DomainError::invalid_state(
                "cannot edit line items of a cancelled invoice",
            ));
        }

        let totals = totals::aggregate(&cmd.line_items)?;

        let ledger = LedgerView {
            amount_paid: self.amount_paid,
            total_amount: totals.total_amount,
            due_date: self.due_date,
        };
        let status = status::after_totals_change(self.status, ledger);

        Ok(vec![InvoiceEvent::LineItemsReplaced(LineItemsReplaced {
            invoice_id: cmd.invoice_id,
            line_items: cmd.line_items.clone(),
            totals,
            status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_payment(
        &self,
        cmd: &RecordPayment,
    ) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        cmd.payment.validate()?;

        if self.payments.iter().any(|p| p.id == cmd.payment.id) {
            return Err(DomainError::conflict(format!(
                "payment {} already recorded",
                cmd.payment.id
            )));
        }

        let amount_paid = self.amount_paid + cmd.payment.amount;
        let ledger = LedgerView {
            amount_paid,
            total_amount: self.totals.total_amount,
            due_date: self.due_date,
        };
        let status = status::transition(self.status, StatusTrigger::PaymentApplied, ledger)?;

        Ok(vec![InvoiceEvent::PaymentRecorded(PaymentRecorded {
            invoice_id: cmd.invoice_id,
            payment: cmd.payment.clone(),
            amount_paid,
            balance_due: self.totals.total_amount - amount_paid,
            status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_sent(&self, cmd: &MarkSent) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        status::transition(self.status, StatusTrigger::Send, self.ledger_view())?;

        Ok(vec![InvoiceEvent::InvoiceSent(InvoiceSent {
            invoice_id: cmd.invoice_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_overdue(&self, cmd: &MarkOverdue) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        status::transition(
            self.status,
            StatusTrigger::DueDatePassed { as_of: cmd.as_of },
            self.ledger_view(),
        )?;

        Ok(vec![InvoiceEvent::InvoiceOverdue(InvoiceOverdue {
            invoice_id: cmd.invoice_id,
            as_of: cmd.as_of,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        status::transition(self.status, StatusTrigger::Cancel, self.ledger_view())?;

        Ok(vec![InvoiceEvent::InvoiceCancelled(InvoiceCancelled {
            invoice_id: cmd.invoice_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
