//! Common test utilities for minibooks-ledger integration tests.

use chrono::NaiveDate;
use minibooks_ledger::config::LedgerSettings;
use minibooks_ledger::models::{
    Account, AccountType, BankFlow, BankTransaction, CreateAccount, Direction, FsMapping,
    JournalLineInput, LedgerPosting, LineItem, PaymentStatus, PostingSource, PurchaseBill,
    SalesInvoice, SourceDocument,
};
use minibooks_ledger::services::{
    build_journal_set, AccountRegistry, MemoryAccountRegistry, MemoryContactDirectory,
    MemoryLedgerStore, PostingEngine, ReportEngine,
};
use rust_decimal::Decimal;
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,minibooks_ledger=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct TestApp {
    pub scope_id: Uuid,
    pub store: Arc<MemoryLedgerStore>,
    pub accounts: Arc<MemoryAccountRegistry>,
    pub contacts: Arc<MemoryContactDirectory>,
    pub posting: PostingEngine,
    pub reports: ReportEngine,
}

/// Build engines over fresh in-memory collaborators and a unique scope.
pub fn spawn_engines() -> TestApp {
    init_tracing();

    let store = Arc::new(MemoryLedgerStore::new());
    let accounts = Arc::new(MemoryAccountRegistry::new());
    let contacts = Arc::new(MemoryContactDirectory::new());

    let posting = PostingEngine::new(
        store.clone(),
        accounts.clone(),
        contacts.clone(),
        LedgerSettings::default(),
    );
    let reports = ReportEngine::new(store.clone(), accounts.clone());

    TestApp {
        scope_id: Uuid::new_v4(),
        store,
        accounts,
        contacts,
        posting,
        reports,
    }
}

pub fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("ISO date literal")
}

pub async fn seed_account_into(
    registry: &dyn AccountRegistry,
    scope_id: Uuid,
    name: &str,
    account_type: AccountType,
    fs: FsMapping,
) -> Account {
    let account = Account::new(
        scope_id,
        CreateAccount {
            gl_account: name.to_string(),
            sub_type: String::new(),
            account_type,
            fs,
            account_number: None,
        },
    );
    registry
        .upsert_account(account)
        .await
        .expect("Failed to seed account")
}

pub async fn seed_account(
    app: &TestApp,
    name: &str,
    account_type: AccountType,
    fs: FsMapping,
) -> Account {
    seed_account_into(app.accounts.as_ref(), app.scope_id, name, account_type, fs).await
}

/// Chart of accounts shared by the posting and report tests.
pub async fn seed_standard_coa_into(registry: &dyn AccountRegistry, scope_id: Uuid) {
    let entries = [
        ("Business Checking", AccountType::CurrentAsset, FsMapping::BalanceSheet),
        ("Accounts Receivable", AccountType::CurrentAsset, FsMapping::BalanceSheet),
        ("Accounts Payable", AccountType::CurrentLiability, FsMapping::BalanceSheet),
        ("Owner's Equity", AccountType::Equity, FsMapping::BalanceSheet),
        ("Sales Revenue", AccountType::DirectIncome, FsMapping::ProfitAndLoss),
        ("Rent Expense", AccountType::IndirectExpense, FsMapping::ProfitAndLoss),
    ];
    for (name, account_type, fs) in entries {
        seed_account_into(registry, scope_id, name, account_type, fs).await;
    }
}

pub async fn seed_standard_coa(app: &TestApp) {
    seed_standard_coa_into(app.accounts.as_ref(), app.scope_id).await;
}

/// Bank statement row wrapped as a postable document.
pub fn bank_txn(id: &str, day: &str, gl: &str, flow: BankFlow, amount: &str) -> SourceDocument {
    SourceDocument::Bank(BankTransaction {
        txn_id: id.to_string(),
        date: date(day),
        description: format!("bank txn {id}"),
        gl_account: gl.to_string(),
        flow,
        amount: dec(amount),
        counterparty: None,
        is_ledger_approved: false,
    })
}

/// Journal document from `(gl_account, debit, credit)` legs; pass `""` for
/// the unused side of each leg.
pub fn journal_doc(set_id: &str, day: &str, legs: &[(&str, &str, &str)]) -> SourceDocument {
    let lines: Vec<JournalLineInput> = legs
        .iter()
        .map(|(gl, debit, credit)| JournalLineInput {
            journal_set_id: Some(set_id.to_string()),
            date: Some(date(day)),
            description: format!("journal {set_id}"),
            gl_account: gl.to_string(),
            counterparty: None,
            debit: if debit.is_empty() { None } else { Some(dec(debit)) },
            credit: if credit.is_empty() { None } else { Some(dec(credit)) },
        })
        .collect();
    let set = build_journal_set(set_id, date(day), &lines).expect("Failed to build journal set");
    SourceDocument::Journal(set)
}

/// Invoice from `(description, gl_account, amount)` items, quantity one.
pub fn invoice(id: &str, day: &str, customer: &str, items: &[(&str, &str, &str)]) -> SalesInvoice {
    let line_items: Vec<LineItem> = items
        .iter()
        .map(|(desc, gl, amount)| LineItem::new(*desc, *gl, Decimal::ONE, dec(amount)))
        .collect();
    let total = line_items.iter().map(|item| item.amount).sum();
    SalesInvoice {
        invoice_id: id.to_string(),
        date: date(day),
        customer_name: customer.to_string(),
        invoice_number: format!("INV-{id}"),
        due_date: None,
        total,
        amount_paid: Decimal::ZERO,
        payment_status: PaymentStatus::Unpaid,
        is_ledger_approved: false,
        line_items,
    }
}

/// Bill from `(description, gl_account, amount)` items, quantity one.
pub fn bill(id: &str, day: &str, vendor: &str, items: &[(&str, &str, &str)]) -> PurchaseBill {
    let line_items: Vec<LineItem> = items
        .iter()
        .map(|(desc, gl, amount)| LineItem::new(*desc, *gl, Decimal::ONE, dec(amount)))
        .collect();
    let total = line_items.iter().map(|item| item.amount).sum();
    PurchaseBill {
        bill_id: id.to_string(),
        date: date(day),
        vendor_name: vendor.to_string(),
        bill_number: format!("BILL-{id}"),
        due_date: None,
        total,
        amount_paid: Decimal::ZERO,
        payment_status: PaymentStatus::Unpaid,
        is_ledger_approved: false,
        line_items,
    }
}

/// Raw ledger posting for seeding report scenarios directly.
pub fn raw_posting(
    scope_id: Uuid,
    day: &str,
    gl: &str,
    direction: Direction,
    amount: &str,
) -> LedgerPosting {
    LedgerPosting {
        posting_id: Uuid::new_v4(),
        scope_id,
        date: date(day),
        description: format!("{gl} {direction} {amount}"),
        source: PostingSource::JournalEntry,
        source_doc_id: format!("seed-{}", Uuid::new_v4()),
        counterparty: None,
        gl_account: gl.to_string(),
        direction,
        amount: dec(amount),
        metadata: None,
    }
}
