//! Invoicing domain module (event-sourced).
//!
//! Line-item tax maths, invoice totals, the payment ledger and the invoice
//! status machine, implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod invoice;
pub mod line_item;
pub mod payment;
pub mod status;
pub mod totals;

pub use invoice::{
    CancelInvoice, Counterparty, Invoice, InvoiceCancelled, InvoiceCommand, InvoiceDirection,
    InvoiceEvent, InvoiceId, InvoiceKind, InvoiceOpened, InvoiceOverdue, InvoiceSent,
    LineItemsReplaced, MarkOverdue, MarkSent, OpenInvoice, PaymentRecorded, RecordPayment,
    ReplaceLineItems,
};
pub use line_item::{LineItem, LineItemAmounts};
pub use payment::{Payment, PaymentMode};
pub use status::{after_totals_change, transition, InvoiceStatus, LedgerView, StatusTrigger};
pub use totals::{aggregate, InvoiceTotals};
