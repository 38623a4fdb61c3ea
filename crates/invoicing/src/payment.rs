//! Payment records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fleetbooks_core::{DomainError, DomainResult, PaymentId};

/// How a payment was made. Serialized with the display strings printed on
/// receipts and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Cheque,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    Other,
}

impl PaymentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::BankTransfer => "Bank Transfer",
            PaymentMode::Cheque => "Cheque",
            PaymentMode::Upi => "UPI",
            PaymentMode::CreditCard => "Credit Card",
            PaymentMode::DebitCard => "Debit Card",
            PaymentMode::Other => "Other",
        }
    }
}

impl core::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A received payment, owned by exactly one invoice.
///
/// Immutable once recorded: payments are only ever appended, never edited or
/// removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

impl Payment {
    pub fn validate(&self) -> DomainResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "payment amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}
