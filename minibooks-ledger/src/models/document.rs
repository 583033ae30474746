//! Source documents whose approval produces ledger postings.

use crate::models::posting::{Counterparty, Direction, PostingSource};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of money through a bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankFlow {
    Paid,
    Received,
}

impl BankFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Received => "received",
        }
    }
}

/// A single bank statement row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    pub txn_id: String,
    pub date: NaiveDate,
    pub description: String,
    /// The bank account's own GL name. Bank rows post a single leg against
    /// it; the offsetting cash-flow side is implicit.
    pub gl_account: String,
    pub flow: BankFlow,
    pub amount: Decimal,
    pub counterparty: Option<Counterparty>,
    pub is_ledger_approved: bool,
}

/// Raw journal line as entered or imported, before validation.
/// Exactly one of `debit`/`credit` must be positive for the line to be valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Explicit grouping column on imported spreadsheets.
    pub journal_set_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub gl_account: String,
    pub counterparty: Option<Counterparty>,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
}

/// Validated journal line, one side only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    pub date: NaiveDate,
    pub description: String,
    pub gl_account: String,
    pub counterparty: Option<Counterparty>,
    pub direction: Direction,
    pub amount: Decimal,
}

/// A balanced set of journal lines posted and reversed as one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSet {
    pub set_id: String,
    pub lines: Vec<JournalLine>,
    pub is_ledger_approved: bool,
}

/// Payment state of an invoice or bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
        }
    }
}

/// One line of an invoice or bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub gl_account: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        gl_account: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            gl_account: gl_account.into(),
            quantity,
            unit_price,
            amount: quantity * unit_price,
        }
    }
}

/// Sales invoice header plus line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesInvoice {
    pub invoice_id: String,
    pub date: NaiveDate,
    pub customer_name: String,
    pub invoice_number: String,
    pub due_date: Option<NaiveDate>,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub payment_status: PaymentStatus,
    pub is_ledger_approved: bool,
    pub line_items: Vec<LineItem>,
}

impl SalesInvoice {
    /// Sum of line item amounts, checked against `total` at posting time.
    pub fn line_total(&self) -> Decimal {
        self.line_items.iter().map(|item| item.amount).sum()
    }
}

/// Purchase bill header plus line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseBill {
    pub bill_id: String,
    pub date: NaiveDate,
    pub vendor_name: String,
    pub bill_number: String,
    pub due_date: Option<NaiveDate>,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub payment_status: PaymentStatus,
    pub is_ledger_approved: bool,
    pub line_items: Vec<LineItem>,
}

impl PurchaseBill {
    pub fn line_total(&self) -> Decimal {
        self.line_items.iter().map(|item| item.amount).sum()
    }
}

/// Tagged union over everything the posting engine can approve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDocument {
    Bank(BankTransaction),
    Journal(JournalSet),
    Invoice(SalesInvoice),
    Bill(PurchaseBill),
}

impl SourceDocument {
    /// The id that groups this document's postings in the ledger.
    pub fn doc_id(&self) -> &str {
        match self {
            Self::Bank(txn) => &txn.txn_id,
            Self::Journal(set) => &set.set_id,
            Self::Invoice(invoice) => &invoice.invoice_id,
            Self::Bill(bill) => &bill.bill_id,
        }
    }

    pub fn source(&self) -> PostingSource {
        match self {
            Self::Bank(_) => PostingSource::BankTransaction,
            Self::Journal(_) => PostingSource::JournalEntry,
            Self::Invoice(_) => PostingSource::SalesInvoice,
            Self::Bill(_) => PostingSource::PurchaseBill,
        }
    }

    pub fn is_ledger_approved(&self) -> bool {
        match self {
            Self::Bank(txn) => txn.is_ledger_approved,
            Self::Journal(set) => set.is_ledger_approved,
            Self::Invoice(invoice) => invoice.is_ledger_approved,
            Self::Bill(bill) => bill.is_ledger_approved,
        }
    }

    pub fn set_ledger_approved(&mut self, approved: bool) {
        match self {
            Self::Bank(txn) => txn.is_ledger_approved = approved,
            Self::Journal(set) => set.is_ledger_approved = approved,
            Self::Invoice(invoice) => invoice.is_ledger_approved = approved,
            Self::Bill(bill) => bill.is_ledger_approved = approved,
        }
    }

    /// Distinct counterparties referenced by this document.
    pub fn counterparties(&self) -> Vec<Counterparty> {
        match self {
            Self::Bank(txn) => txn.counterparty.iter().cloned().collect(),
            Self::Journal(set) => {
                let mut seen = Vec::new();
                for line in &set.lines {
                    if let Some(cp) = &line.counterparty {
                        if !seen.contains(cp) {
                            seen.push(cp.clone());
                        }
                    }
                }
                seen
            }
            Self::Invoice(invoice) => {
                vec![Counterparty::Customer(invoice.customer_name.clone())]
            }
            Self::Bill(bill) => vec![Counterparty::Vendor(bill.vendor_name.clone())],
        }
    }
}
