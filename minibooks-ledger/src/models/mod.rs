//! Domain models for minibooks-ledger.

mod account;
mod contact;
mod document;
mod posting;
mod report;

pub use account::{Account, AccountType, CreateAccount, FsMapping};
pub use contact::{Contact, ContactKind};
pub use document::{
    BankFlow, BankTransaction, JournalLine, JournalLineInput, JournalSet, LineItem, PaymentStatus,
    PurchaseBill, SalesInvoice, SourceDocument,
};
pub use posting::{Counterparty, Direction, LedgerPosting, PostingSource};
pub use report::{
    AccountLedger, AccountLedgerLine, Granularity, Period, ReportBody, ReportLine, ReportRequest,
    ReportResult, ReportSection, ReportType, ReportWarning, UnclassifiedAccount, UnclassifiedReason,
};
