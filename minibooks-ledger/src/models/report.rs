//! Report models: requests, periods, sections, and warnings.

use crate::models::posting::{Direction, PostingSource};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which report to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    ProfitAndLoss,
    BalanceSheet,
}

/// Column layout of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Summary,
    Monthly,
    Quarterly,
}

/// A contiguous calendar bucket used to slice the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

/// Parameters of one report generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub scope_id: Uuid,
    pub report_type: ReportType,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
}

/// One account row of a report section, one amount per period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub gl_account: String,
    pub period_amounts: Vec<Decimal>,
    pub total: Decimal,
}

/// A classified group of report lines with column-wise totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    pub lines: Vec<ReportLine>,
    pub period_totals: Vec<Decimal>,
    pub total: Decimal,
}

/// Report payload, by report kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum ReportBody {
    ProfitAndLoss {
        income: ReportSection,
        expenses: ReportSection,
        net_profit_loss: Vec<Decimal>,
        net_total: Decimal,
    },
    BalanceSheet {
        assets: ReportSection,
        liabilities: ReportSection,
        equity: ReportSection,
        total_liabilities_and_equity: Vec<Decimal>,
    },
}

/// Why an account could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnclassifiedReason {
    NotInChartOfAccounts,
    FsTypeMismatch,
}

impl UnclassifiedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInChartOfAccounts => "not found in Chart of Accounts",
            Self::FsTypeMismatch => "financial statement mapping contradicts account type",
        }
    }
}

impl std::fmt::Display for UnclassifiedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account with a non-zero balance that the chart of accounts could not
/// classify cleanly. Attached to the report, never fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnclassifiedAccount {
    pub gl_account: String,
    pub reason: UnclassifiedReason,
}

/// Non-fatal data-quality signals attached to a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ReportWarning {
    BalanceSheetOutOfBalance { difference: Decimal },
}

/// A generated report plus its classification diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResult {
    pub report_type: ReportType,
    pub granularity: Granularity,
    pub periods: Vec<Period>,
    pub body: ReportBody,
    pub unclassified_gl_accounts: Vec<UnclassifiedAccount>,
    pub warnings: Vec<ReportWarning>,
}

/// One ledger row in an account statement view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLedgerLine {
    pub posting_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub source: PostingSource,
    pub direction: Direction,
    pub amount: Decimal,
    pub running_balance: Decimal,
}

/// Account statement with running balance for a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLedger {
    pub gl_account: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub lines: Vec<AccountLedgerLine>,
}
