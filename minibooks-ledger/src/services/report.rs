//! Report engine: profit & loss and balance sheet generation over the
//! ledger, in summary or columnar (monthly/quarterly) form.

use crate::models::{
    AccountLedger, AccountLedgerLine, FsMapping, Granularity, LedgerPosting, Period, ReportBody,
    ReportLine, ReportRequest, ReportResult, ReportSection, ReportType, UnclassifiedAccount,
    UnclassifiedReason, ReportWarning,
};
use crate::services::registry::{AccountRegistry, AccountResolver};
use crate::services::store::{LedgerQuery, LedgerStore};
use chrono::{Datelike, NaiveDate};
use minibooks_core::error::AppError;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Identity tolerance for the balance sheet check (assets vs liabilities
/// plus equity). Differences above this surface as a warning.
const IDENTITY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Label injected for the programmatically computed cumulative net income
/// line on the balance sheet. Additive to any user-defined account of the
/// same name, never merged with it.
const RETAINED_EARNINGS_LABEL: &str = "Retained Earnings";

/// Derives financial statements from the ledger store and the chart of
/// accounts. All aggregation is pure and synchronous; the only suspension
/// points are the two reads at the start of each call.
pub struct ReportEngine {
    store: Arc<dyn LedgerStore>,
    accounts: Arc<dyn AccountRegistry>,
}

impl ReportEngine {
    pub fn new(store: Arc<dyn LedgerStore>, accounts: Arc<dyn AccountRegistry>) -> Self {
        Self { store, accounts }
    }

    /// Generate a report. Classification problems never block generation;
    /// they ride along in `unclassified_gl_accounts` and `warnings`.
    #[instrument(skip(self, request), fields(scope_id = %request.scope_id, report_type = ?request.report_type, granularity = ?request.granularity))]
    pub async fn generate(&self, request: &ReportRequest) -> Result<ReportResult, AppError> {
        if request.start > request.end {
            return Err(AppError::validation(
                "report start date must not be after its end date",
            ));
        }

        let periods = periods_for(request.start, request.end, request.granularity);
        let resolver = AccountResolver::snapshot(self.accounts.as_ref(), request.scope_id).await?;

        // A balance sheet is cumulative since inception; only the profit and
        // loss statement windows on the start date.
        let filter = match request.report_type {
            ReportType::ProfitAndLoss => LedgerQuery {
                date_from: Some(request.start),
                date_to: Some(request.end),
                gl_account: None,
            },
            ReportType::BalanceSheet => LedgerQuery {
                date_from: None,
                date_to: Some(request.end),
                gl_account: None,
            },
        };
        let postings = self.store.query(request.scope_id, &filter).await?;

        let balances = bucket_balances(&postings, &periods, request.report_type);

        let mut unclassified = Vec::new();
        let body = match request.report_type {
            ReportType::ProfitAndLoss => {
                build_profit_and_loss(balances, &periods, &resolver, &mut unclassified)
            }
            ReportType::BalanceSheet => {
                build_balance_sheet(balances, &periods, &resolver, &mut unclassified)
            }
        };

        let mut warnings = Vec::new();
        if let ReportBody::BalanceSheet {
            assets,
            total_liabilities_and_equity,
            ..
        } = &body
        {
            let asset_total = assets
                .period_totals
                .last()
                .copied()
                .unwrap_or(Decimal::ZERO);
            let other_total = total_liabilities_and_equity
                .last()
                .copied()
                .unwrap_or(Decimal::ZERO);
            let difference = (asset_total - other_total).abs();
            if difference > IDENTITY_TOLERANCE {
                warnings.push(ReportWarning::BalanceSheetOutOfBalance { difference });
            }
        }

        info!(
            posting_count = postings.len(),
            period_count = periods.len(),
            unclassified = unclassified.len(),
            "Report generated"
        );

        Ok(ReportResult {
            report_type: request.report_type,
            granularity: request.granularity,
            periods,
            body,
            unclassified_gl_accounts: unclassified,
            warnings,
        })
    }

    /// Account statement with running balance for a date range. The opening
    /// balance accumulates everything before `start`.
    #[instrument(skip(self), fields(scope_id = %scope_id, gl_account = %gl_account))]
    pub async fn account_ledger(
        &self,
        scope_id: Uuid,
        gl_account: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AccountLedger, AppError> {
        let opening_balance = match start.pred_opt() {
            Some(day_before) => {
                let prior = self
                    .store
                    .query(
                        scope_id,
                        &LedgerQuery {
                            date_from: None,
                            date_to: Some(day_before),
                            gl_account: Some(gl_account.to_string()),
                        },
                    )
                    .await?;
                prior.iter().map(LedgerPosting::signed_amount).sum()
            }
            None => Decimal::ZERO,
        };

        let rows = self
            .store
            .query(
                scope_id,
                &LedgerQuery {
                    date_from: Some(start),
                    date_to: Some(end),
                    gl_account: Some(gl_account.to_string()),
                },
            )
            .await?;

        let mut running_balance = opening_balance;
        let lines = rows
            .iter()
            .map(|posting| {
                running_balance += posting.signed_amount();
                AccountLedgerLine {
                    posting_id: posting.posting_id,
                    date: posting.date,
                    description: posting.description.clone(),
                    source: posting.source,
                    direction: posting.direction,
                    amount: posting.amount,
                    running_balance,
                }
            })
            .collect();

        Ok(AccountLedger {
            gl_account: gl_account.to_string(),
            start,
            end,
            opening_balance,
            closing_balance: running_balance,
            lines,
        })
    }
}

/// Accumulate debit-positive balances per account per period.
///
/// Profit and loss buckets are period-isolated; balance sheet buckets are
/// cumulative through each period's end date.
fn bucket_balances(
    postings: &[LedgerPosting],
    periods: &[Period],
    report_type: ReportType,
) -> BTreeMap<String, Vec<Decimal>> {
    let mut balances: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
    for posting in postings {
        let buckets = balances
            .entry(posting.gl_account.clone())
            .or_insert_with(|| vec![Decimal::ZERO; periods.len()]);
        match report_type {
            ReportType::ProfitAndLoss => {
                if let Some(idx) = periods
                    .iter()
                    .position(|p| posting.date >= p.start && posting.date <= p.end)
                {
                    buckets[idx] += posting.signed_amount();
                }
            }
            ReportType::BalanceSheet => {
                for (idx, period) in periods.iter().enumerate() {
                    if posting.date <= period.end {
                        buckets[idx] += posting.signed_amount();
                    }
                }
            }
        }
    }
    balances
}

fn build_profit_and_loss(
    balances: BTreeMap<String, Vec<Decimal>>,
    periods: &[Period],
    resolver: &AccountResolver,
    unclassified: &mut Vec<UnclassifiedAccount>,
) -> ReportBody {
    let mut income_lines = Vec::new();
    let mut expense_lines = Vec::new();

    for (gl_account, buckets) in balances {
        if buckets.iter().all(Decimal::is_zero) {
            continue;
        }
        let Some(account) = resolver.resolve(&gl_account) else {
            unclassified.push(UnclassifiedAccount {
                gl_account,
                reason: UnclassifiedReason::NotInChartOfAccounts,
            });
            continue;
        };

        let ty = account.account_type;
        if ty.is_income() {
            // Credits grow income; negate the debit-positive balance for
            // display.
            if account.fs != FsMapping::ProfitAndLoss {
                unclassified.push(UnclassifiedAccount {
                    gl_account: gl_account.clone(),
                    reason: UnclassifiedReason::FsTypeMismatch,
                });
            }
            let amounts: Vec<Decimal> = buckets.iter().map(|b| -*b).collect();
            income_lines.push(windowed_line(gl_account, amounts));
        } else if ty.is_expense() {
            if account.fs != FsMapping::ProfitAndLoss {
                unclassified.push(UnclassifiedAccount {
                    gl_account: gl_account.clone(),
                    reason: UnclassifiedReason::FsTypeMismatch,
                });
            }
            expense_lines.push(windowed_line(gl_account, buckets));
        }
        // Balance sheet accounts are out of scope for a profit and loss
        // statement.
    }

    let income = windowed_section(income_lines, periods.len());
    let expenses = windowed_section(expense_lines, periods.len());
    let net_profit_loss: Vec<Decimal> = income
        .period_totals
        .iter()
        .zip(&expenses.period_totals)
        .map(|(inc, exp)| *inc - *exp)
        .collect();
    let net_total = income.total - expenses.total;

    ReportBody::ProfitAndLoss {
        income,
        expenses,
        net_profit_loss,
        net_total,
    }
}

fn build_balance_sheet(
    balances: BTreeMap<String, Vec<Decimal>>,
    periods: &[Period],
    resolver: &AccountResolver,
    unclassified: &mut Vec<UnclassifiedAccount>,
) -> ReportBody {
    let mut asset_lines = Vec::new();
    let mut liability_lines = Vec::new();
    let mut equity_lines = Vec::new();
    let mut retained = vec![Decimal::ZERO; periods.len()];

    for (gl_account, buckets) in balances {
        if buckets.iter().all(Decimal::is_zero) {
            continue;
        }
        let Some(account) = resolver.resolve(&gl_account) else {
            unclassified.push(UnclassifiedAccount {
                gl_account,
                reason: UnclassifiedReason::NotInChartOfAccounts,
            });
            continue;
        };

        if account.fs_mismatch() {
            unclassified.push(UnclassifiedAccount {
                gl_account: gl_account.clone(),
                reason: UnclassifiedReason::FsTypeMismatch,
            });
        }

        let ty = account.account_type;
        if ty.is_asset() {
            asset_lines.push(cumulative_line(gl_account, buckets));
        } else if ty.is_liability() {
            liability_lines.push(cumulative_line(gl_account, negated(buckets)));
        } else if ty.is_equity() {
            equity_lines.push(cumulative_line(gl_account, negated(buckets)));
        } else {
            // Income and expense accounts never appear as balance sheet
            // lines; their cumulative net feeds the synthetic retained
            // earnings row.
            for (idx, bucket) in buckets.iter().enumerate() {
                retained[idx] -= *bucket;
            }
        }
    }

    if !retained.iter().all(Decimal::is_zero) {
        equity_lines.push(cumulative_line(RETAINED_EARNINGS_LABEL.to_string(), retained));
    }

    let assets = cumulative_section(asset_lines, periods.len());
    let liabilities = cumulative_section(liability_lines, periods.len());
    let equity = cumulative_section(equity_lines, periods.len());

    let total_liabilities_and_equity: Vec<Decimal> = liabilities
        .period_totals
        .iter()
        .zip(&equity.period_totals)
        .map(|(liability, eq)| *liability + *eq)
        .collect();

    ReportBody::BalanceSheet {
        assets,
        liabilities,
        equity,
        total_liabilities_and_equity,
    }
}

fn negated(buckets: Vec<Decimal>) -> Vec<Decimal> {
    buckets.into_iter().map(|b| -b).collect()
}

/// Line for a period-isolated report: the total sums the columns.
fn windowed_line(gl_account: String, period_amounts: Vec<Decimal>) -> ReportLine {
    let total = period_amounts.iter().copied().sum();
    ReportLine {
        gl_account,
        period_amounts,
        total,
    }
}

/// Line for a cumulative report: the total is the last column, not a sum.
fn cumulative_line(gl_account: String, period_amounts: Vec<Decimal>) -> ReportLine {
    let total = period_amounts.last().copied().unwrap_or(Decimal::ZERO);
    ReportLine {
        gl_account,
        period_amounts,
        total,
    }
}

fn windowed_section(lines: Vec<ReportLine>, period_count: usize) -> ReportSection {
    let mut period_totals = column_totals(&lines);
    if period_totals.is_empty() {
        period_totals = vec![Decimal::ZERO; period_count];
    }
    let total = period_totals.iter().copied().sum();
    ReportSection {
        lines,
        period_totals,
        total,
    }
}

fn cumulative_section(lines: Vec<ReportLine>, period_count: usize) -> ReportSection {
    let mut period_totals = column_totals(&lines);
    if period_totals.is_empty() {
        period_totals = vec![Decimal::ZERO; period_count];
    }
    let total = period_totals.last().copied().unwrap_or(Decimal::ZERO);
    ReportSection {
        lines,
        period_totals,
        total,
    }
}

fn column_totals(lines: &[ReportLine]) -> Vec<Decimal> {
    let Some(first) = lines.first() else {
        return Vec::new();
    };
    let mut totals = vec![Decimal::ZERO; first.period_amounts.len()];
    for line in lines {
        for (idx, amount) in line.period_amounts.iter().enumerate() {
            totals[idx] += *amount;
        }
    }
    totals
}

/// Partition a date range into consecutive calendar buckets. The first
/// period starts at `start` (not necessarily the 1st), intermediate periods
/// are full calendar months or quarters, and the last period is clipped to
/// `end`. Summary yields a single bucket for the whole range.
pub fn periods_for(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Vec<Period> {
    if start > end {
        return Vec::new();
    }

    match granularity {
        Granularity::Summary => vec![Period {
            start,
            end,
            label: format!("{} to {}", start, end),
        }],
        Granularity::Monthly | Granularity::Quarterly => {
            let mut periods = Vec::new();
            let mut cursor = start;
            while cursor <= end {
                let bucket_end = match granularity {
                    Granularity::Monthly => end_of_month(cursor),
                    _ => end_of_quarter(cursor),
                };
                let clipped = bucket_end.min(end);
                let label = match granularity {
                    Granularity::Monthly => cursor.format("%b %Y").to_string(),
                    _ => format!("Q{} {}", quarter_of(cursor), cursor.year()),
                };
                periods.push(Period {
                    start: cursor,
                    end: clipped,
                    label,
                });
                match clipped.succ_opt() {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
            periods
        }
    }
}

fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.and_then(|d| d.pred_opt()).unwrap_or(date)
}

fn end_of_quarter(date: NaiveDate) -> NaiveDate {
    let quarter_end_month = quarter_of(date) * 3;
    let last = NaiveDate::from_ymd_opt(date.year(), quarter_end_month, 1)
        .map(end_of_month);
    last.unwrap_or(date)
}
