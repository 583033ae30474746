//! Posting engine: turns approved source documents into balanced ledger
//! postings and reverses them atomically per document.

use crate::config::LedgerSettings;
use crate::models::{
    Account, Contact, Counterparty, Direction, LedgerPosting, PaymentStatus, PostingSource,
    SalesInvoice, SourceDocument,
};
use crate::services::contacts::ContactDirectory;
use crate::services::registry::{AccountRegistry, AccountResolver};
use crate::services::store::LedgerStore;
use chrono::NaiveDate;
use minibooks_core::error::AppError;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Outcome of posting a batch of independent documents. Failed documents are
/// skipped with a reason; the batch itself always completes.
#[derive(Debug, Default)]
pub struct BatchPostOutcome {
    pub posted: Vec<String>,
    pub skipped: Vec<SkippedDocument>,
}

#[derive(Debug)]
pub struct SkippedDocument {
    pub doc_id: String,
    pub reason: String,
}

/// Converts source documents into ledger postings and back.
pub struct PostingEngine {
    store: Arc<dyn LedgerStore>,
    accounts: Arc<dyn AccountRegistry>,
    contacts: Arc<dyn ContactDirectory>,
    settings: LedgerSettings,
}

impl PostingEngine {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        accounts: Arc<dyn AccountRegistry>,
        contacts: Arc<dyn ContactDirectory>,
        settings: LedgerSettings,
    ) -> Self {
        Self {
            store,
            accounts,
            contacts,
            settings,
        }
    }

    /// Post one approved source document: resolve its GL references against a
    /// fresh chart-of-accounts snapshot, convert it into postings, re-check
    /// the document-level balance, and append everything in one atomic write.
    /// All-or-nothing per document; a document's lines are never split.
    #[instrument(skip(self, doc), fields(scope_id = %scope_id, doc_id = %doc.doc_id()))]
    pub async fn post_document(
        &self,
        scope_id: Uuid,
        doc: &mut SourceDocument,
    ) -> Result<Vec<LedgerPosting>, AppError> {
        // Optimistic guard: serializes post/unpost per document.
        if doc.is_ledger_approved() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "document {} is already posted",
                doc.doc_id()
            )));
        }

        let resolver = AccountResolver::snapshot(self.accounts.as_ref(), scope_id).await?;
        let postings = self.convert(scope_id, doc, &resolver)?;
        check_document_balance(doc, &postings)?;

        for counterparty in doc.counterparties() {
            self.ensure_contact(scope_id, &counterparty).await;
        }

        self.store.append_all(&postings).await?;
        doc.set_ledger_approved(true);

        info!(
            source = %doc.source(),
            count = postings.len(),
            "Document posted"
        );
        Ok(postings)
    }

    /// Post a batch of independent documents, skipping the ones that fail and
    /// recording why. A failure never aborts the rest of the batch.
    #[instrument(skip(self, docs), fields(scope_id = %scope_id, doc_count = docs.len()))]
    pub async fn post_batch(
        &self,
        scope_id: Uuid,
        docs: &mut [SourceDocument],
    ) -> BatchPostOutcome {
        let mut outcome = BatchPostOutcome::default();
        for doc in docs.iter_mut() {
            let doc_id = doc.doc_id().to_string();
            match self.post_document(scope_id, doc).await {
                Ok(_) => outcome.posted.push(doc_id),
                Err(err) => {
                    warn!(doc_id = %doc_id, error = %err, "Document skipped");
                    outcome.skipped.push(SkippedDocument {
                        doc_id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        info!(
            posted = outcome.posted.len(),
            skipped = outcome.skipped.len(),
            "Batch post finished"
        );
        outcome
    }

    /// Remove every posting for a document (payment legs share the invoice's
    /// id and go with it) and clear its approval flag. Idempotent: unposting
    /// a document with no postings is a no-op.
    #[instrument(skip(self, doc), fields(scope_id = %scope_id, doc_id = %doc.doc_id()))]
    pub async fn unpost_document(
        &self,
        scope_id: Uuid,
        doc: &mut SourceDocument,
    ) -> Result<u64, AppError> {
        let removed = self.store.delete_by_source(scope_id, doc.doc_id()).await?;
        doc.set_ledger_approved(false);
        if let SourceDocument::Invoice(invoice) = doc {
            invoice.amount_paid = Decimal::ZERO;
            invoice.payment_status = PaymentStatus::Unpaid;
        }
        info!(removed, "Document unposted");
        Ok(removed)
    }

    /// Record a payment against a posted invoice: debit the deposit account,
    /// credit receivables, both tagged with the invoice's id so an unpost
    /// reverses them together.
    #[instrument(skip(self, invoice), fields(scope_id = %scope_id, invoice_id = %invoice.invoice_id, amount = %amount))]
    pub async fn post_invoice_payment(
        &self,
        scope_id: Uuid,
        invoice: &mut SalesInvoice,
        deposit_gl: &str,
        date: NaiveDate,
        amount: Decimal,
    ) -> Result<Vec<LedgerPosting>, AppError> {
        if !invoice.is_ledger_approved {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "invoice {} must be posted before payments can be recorded",
                invoice.invoice_id
            )));
        }
        if amount <= Decimal::ZERO {
            return Err(AppError::validation("payment amount must be positive"));
        }

        let resolver = AccountResolver::snapshot(self.accounts.as_ref(), scope_id).await?;
        let deposit = resolve_account(&resolver, deposit_gl)?;
        let receivable = resolve_account(&resolver, &self.settings.receivable_account)?;

        let description = format!("Payment for invoice {}", invoice.invoice_number);
        let counterparty = Some(Counterparty::Customer(invoice.customer_name.clone()));
        let metadata = serde_json::json!({ "invoice_number": invoice.invoice_number });

        let postings = vec![
            new_posting(
                scope_id,
                date,
                &description,
                PostingSource::SalesInvoicePayment,
                &invoice.invoice_id,
                counterparty.clone(),
                &deposit.gl_account,
                Direction::Debit,
                amount,
                Some(metadata.clone()),
            ),
            new_posting(
                scope_id,
                date,
                &description,
                PostingSource::SalesInvoicePayment,
                &invoice.invoice_id,
                counterparty,
                &receivable.gl_account,
                Direction::Credit,
                amount,
                Some(metadata),
            ),
        ];

        self.store.append_all(&postings).await?;

        invoice.amount_paid += amount;
        invoice.payment_status = if invoice.amount_paid >= invoice.total {
            PaymentStatus::Paid
        } else {
            PaymentStatus::PartiallyPaid
        };

        info!(
            payment_status = invoice.payment_status.as_str(),
            amount_paid = %invoice.amount_paid,
            "Invoice payment posted"
        );
        Ok(postings)
    }

    /// Convert a document into posting rows. Every GL reference must resolve
    /// against the snapshot or the whole document is rejected.
    fn convert(
        &self,
        scope_id: Uuid,
        doc: &SourceDocument,
        resolver: &AccountResolver,
    ) -> Result<Vec<LedgerPosting>, AppError> {
        match doc {
            SourceDocument::Bank(txn) => {
                let account = resolve_account(resolver, &txn.gl_account)?;
                // Single-leg by design: a bank row posts only against the
                // bank's own GL, signed by paid/received.
                let direction = match txn.flow {
                    crate::models::BankFlow::Received => Direction::Debit,
                    crate::models::BankFlow::Paid => Direction::Credit,
                };
                Ok(vec![new_posting(
                    scope_id,
                    txn.date,
                    &txn.description,
                    PostingSource::BankTransaction,
                    &txn.txn_id,
                    txn.counterparty.clone(),
                    &account.gl_account,
                    direction,
                    txn.amount,
                    None,
                )])
            }
            SourceDocument::Journal(set) => {
                let mut postings = Vec::with_capacity(set.lines.len());
                for line in &set.lines {
                    let account = resolve_account(resolver, &line.gl_account)?;
                    postings.push(new_posting(
                        scope_id,
                        line.date,
                        &line.description,
                        PostingSource::JournalEntry,
                        &set.set_id,
                        line.counterparty.clone(),
                        &account.gl_account,
                        line.direction,
                        line.amount,
                        None,
                    ));
                }
                Ok(postings)
            }
            SourceDocument::Invoice(invoice) => {
                if invoice.line_total() != invoice.total {
                    return Err(AppError::validation(format!(
                        "invoice {} total {} does not match line items sum {}",
                        invoice.invoice_number,
                        invoice.total,
                        invoice.line_total()
                    )));
                }
                let receivable = resolve_account(resolver, &self.settings.receivable_account)?;
                let counterparty = Some(Counterparty::Customer(invoice.customer_name.clone()));
                let metadata = serde_json::json!({ "invoice_number": invoice.invoice_number });

                // Debit A/R for the header total, credit revenue per line.
                let mut postings = vec![new_posting(
                    scope_id,
                    invoice.date,
                    &format!("Invoice {}", invoice.invoice_number),
                    PostingSource::SalesInvoice,
                    &invoice.invoice_id,
                    counterparty.clone(),
                    &receivable.gl_account,
                    Direction::Debit,
                    invoice.total,
                    Some(metadata.clone()),
                )];
                for item in &invoice.line_items {
                    let revenue = resolve_account(resolver, &item.gl_account)?;
                    postings.push(new_posting(
                        scope_id,
                        invoice.date,
                        &item.description,
                        PostingSource::SalesInvoice,
                        &invoice.invoice_id,
                        counterparty.clone(),
                        &revenue.gl_account,
                        Direction::Credit,
                        item.amount,
                        Some(metadata.clone()),
                    ));
                }
                Ok(postings)
            }
            SourceDocument::Bill(bill) => {
                if bill.line_total() != bill.total {
                    return Err(AppError::validation(format!(
                        "bill {} total {} does not match line items sum {}",
                        bill.bill_number,
                        bill.total,
                        bill.line_total()
                    )));
                }
                let payable = resolve_account(resolver, &self.settings.payable_account)?;
                let counterparty = Some(Counterparty::Vendor(bill.vendor_name.clone()));
                let metadata = serde_json::json!({ "bill_number": bill.bill_number });

                // Mirror of the invoice: debit expense per line, credit A/P.
                let mut postings = Vec::with_capacity(bill.line_items.len() + 1);
                for item in &bill.line_items {
                    let expense = resolve_account(resolver, &item.gl_account)?;
                    postings.push(new_posting(
                        scope_id,
                        bill.date,
                        &item.description,
                        PostingSource::PurchaseBill,
                        &bill.bill_id,
                        counterparty.clone(),
                        &expense.gl_account,
                        Direction::Debit,
                        item.amount,
                        Some(metadata.clone()),
                    ));
                }
                postings.push(new_posting(
                    scope_id,
                    bill.date,
                    &format!("Bill {}", bill.bill_number),
                    PostingSource::PurchaseBill,
                    &bill.bill_id,
                    counterparty,
                    &payable.gl_account,
                    Direction::Credit,
                    bill.total,
                    Some(metadata),
                ));
                Ok(postings)
            }
        }
    }

    /// Make sure the document's counterparty exists in the contact directory.
    /// Contact problems are logged and never block the posting itself.
    async fn ensure_contact(&self, scope_id: Uuid, counterparty: &Counterparty) {
        let name = counterparty.name();
        let kind = counterparty.kind();
        match self
            .contacts
            .find_by_name(scope_id, name, Some(kind))
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                let contact = Contact::new(scope_id, name, kind);
                if let Err(err) = self.contacts.create(contact).await {
                    warn!(name = %name, kind = %kind, error = %err, "Contact auto-create failed");
                }
            }
            Err(err) => {
                warn!(name = %name, kind = %kind, error = %err, "Contact lookup failed");
            }
        }
    }
}

fn resolve_account<'a>(
    resolver: &'a AccountResolver,
    gl_account: &str,
) -> Result<&'a Account, AppError> {
    resolver
        .resolve(gl_account)
        .ok_or_else(|| AppError::UnresolvedAccount {
            gl_account: gl_account.to_string(),
        })
}

/// Re-check the document-level double-entry balance right before the write.
/// Upstream validation should make this unreachable for journal sets, but the
/// invariant is cheap to verify against the rows actually being written.
/// Bank rows are deliberately single-leg and exempt.
fn check_document_balance(
    doc: &SourceDocument,
    postings: &[LedgerPosting],
) -> Result<(), AppError> {
    if matches!(doc, SourceDocument::Bank(_)) {
        return Ok(());
    }

    let mut debits = Decimal::ZERO;
    let mut credits = Decimal::ZERO;
    for posting in postings {
        match posting.direction {
            Direction::Debit => debits += posting.amount,
            Direction::Credit => credits += posting.amount,
        }
    }

    if debits != credits {
        return Err(AppError::Imbalance {
            source_doc_id: doc.doc_id().to_string(),
            debits,
            credits,
        });
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn new_posting(
    scope_id: Uuid,
    date: NaiveDate,
    description: &str,
    source: PostingSource,
    source_doc_id: &str,
    counterparty: Option<Counterparty>,
    gl_account: &str,
    direction: Direction,
    amount: Decimal,
    metadata: Option<serde_json::Value>,
) -> LedgerPosting {
    LedgerPosting {
        posting_id: Uuid::new_v4(),
        scope_id,
        date,
        description: description.to_string(),
        source,
        source_doc_id: source_doc_id.to_string(),
        counterparty,
        gl_account: gl_account.to_string(),
        direction,
        amount,
        metadata,
    }
}
