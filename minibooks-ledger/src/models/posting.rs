//! Ledger posting model for double-entry accounting.

use crate::models::contact::ContactKind;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Posting direction (debit or credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The source document kind a posting originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingSource {
    BankTransaction,
    JournalEntry,
    SalesInvoice,
    PurchaseBill,
    SalesInvoicePayment,
}

impl PostingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransaction => "Bank Transaction",
            Self::JournalEntry => "Journal Entry",
            Self::SalesInvoice => "Sales Invoice",
            Self::PurchaseBill => "Purchase Bill",
            Self::SalesInvoicePayment => "Sales Invoice Payment",
        }
    }
}

impl std::fmt::Display for PostingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counterparty on a posting. A posting carries a customer or a vendor,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Counterparty {
    Customer(String),
    Vendor(String),
}

impl Counterparty {
    pub fn name(&self) -> &str {
        match self {
            Self::Customer(name) | Self::Vendor(name) => name,
        }
    }

    pub fn kind(&self) -> ContactKind {
        match self {
            Self::Customer(_) => ContactKind::Customer,
            Self::Vendor(_) => ContactKind::Vendor,
        }
    }
}

/// Single row of the general ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerPosting {
    pub posting_id: Uuid,
    pub scope_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub source: PostingSource,
    /// Groups the postings of one source document for atomic reversal.
    pub source_doc_id: String,
    pub counterparty: Option<Counterparty>,
    pub gl_account: String,
    pub direction: Direction,
    pub amount: Decimal,
    pub metadata: Option<serde_json::Value>,
}

impl LedgerPosting {
    /// Get signed amount (positive for debit, negative for credit).
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Debit => self.amount,
            Direction::Credit => -self.amount,
        }
    }

    pub fn debit_amount(&self) -> Option<Decimal> {
        match self.direction {
            Direction::Debit => Some(self.amount),
            Direction::Credit => None,
        }
    }

    pub fn credit_amount(&self) -> Option<Decimal> {
        match self.direction {
            Direction::Credit => Some(self.amount),
            Direction::Debit => None,
        }
    }
}
