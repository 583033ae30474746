//! Chart of accounts model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account types following the chart-of-accounts taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    DirectIncome,
    IndirectIncome,
    DirectExpense,
    IndirectExpense,
    NonCurrentAsset,
    CurrentAsset,
    CurrentLiability,
    NonCurrentLiability,
    Equity,
}

impl AccountType {
    /// Get display representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectIncome => "Direct Income",
            Self::IndirectIncome => "Indirect Income",
            Self::DirectExpense => "Direct Expense",
            Self::IndirectExpense => "Indirect Expense",
            Self::NonCurrentAsset => "Non Current Asset",
            Self::CurrentAsset => "Current Asset",
            Self::CurrentLiability => "Current Liability",
            Self::NonCurrentLiability => "Non Current Liability",
            Self::Equity => "Equity",
        }
    }

    /// Parse from display representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Direct Income" => Some(Self::DirectIncome),
            "Indirect Income" => Some(Self::IndirectIncome),
            "Direct Expense" => Some(Self::DirectExpense),
            "Indirect Expense" => Some(Self::IndirectExpense),
            "Non Current Asset" => Some(Self::NonCurrentAsset),
            "Current Asset" => Some(Self::CurrentAsset),
            "Current Liability" => Some(Self::CurrentLiability),
            "Non Current Liability" => Some(Self::NonCurrentLiability),
            "Equity" => Some(Self::Equity),
            _ => None,
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::DirectIncome | Self::IndirectIncome)
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, Self::DirectExpense | Self::IndirectExpense)
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, Self::NonCurrentAsset | Self::CurrentAsset)
    }

    pub fn is_liability(&self) -> bool {
        matches!(self, Self::CurrentLiability | Self::NonCurrentLiability)
    }

    pub fn is_equity(&self) -> bool {
        matches!(self, Self::Equity)
    }

    /// The financial statement this type implies. Accounts whose stored `fs`
    /// disagrees with this are flagged by the report engine, never corrected.
    pub fn default_fs(&self) -> FsMapping {
        if self.is_income() || self.is_expense() {
            FsMapping::ProfitAndLoss
        } else {
            FsMapping::BalanceSheet
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which financial statement an account's balance flows into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsMapping {
    ProfitAndLoss,
    BalanceSheet,
}

impl FsMapping {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfitAndLoss => "Profit and Loss",
            Self::BalanceSheet => "Balance Sheet",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Profit and Loss" => Some(Self::ProfitAndLoss),
            "Balance Sheet" => Some(Self::BalanceSheet),
            _ => None,
        }
    }
}

impl std::fmt::Display for FsMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chart of accounts entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: Uuid,
    pub scope_id: Uuid,
    /// Display name, unique per scope after normalization.
    pub gl_account: String,
    pub sub_type: String,
    pub account_type: AccountType,
    pub fs: FsMapping,
    pub account_number: Option<String>,
}

impl Account {
    pub fn new(scope_id: Uuid, input: CreateAccount) -> Self {
        Self {
            account_id: Uuid::new_v4(),
            scope_id,
            gl_account: input.gl_account,
            sub_type: input.sub_type,
            account_type: input.account_type,
            fs: input.fs,
            account_number: input.account_number,
        }
    }

    /// Whether the stored statement mapping contradicts the account type.
    pub fn fs_mismatch(&self) -> bool {
        self.fs != self.account_type.default_fs()
    }
}

/// Input for creating a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub gl_account: String,
    pub sub_type: String,
    pub account_type: AccountType,
    pub fs: FsMapping,
    pub account_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_round_trips_through_display_form() {
        for ty in [
            AccountType::DirectIncome,
            AccountType::IndirectIncome,
            AccountType::DirectExpense,
            AccountType::IndirectExpense,
            AccountType::NonCurrentAsset,
            AccountType::CurrentAsset,
            AccountType::CurrentLiability,
            AccountType::NonCurrentLiability,
            AccountType::Equity,
        ] {
            assert_eq!(AccountType::from_str(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn income_and_expense_types_imply_profit_and_loss() {
        assert_eq!(
            AccountType::DirectIncome.default_fs(),
            FsMapping::ProfitAndLoss
        );
        assert_eq!(
            AccountType::IndirectExpense.default_fs(),
            FsMapping::ProfitAndLoss
        );
        assert_eq!(
            AccountType::CurrentAsset.default_fs(),
            FsMapping::BalanceSheet
        );
        assert_eq!(
            AccountType::NonCurrentLiability.default_fs(),
            FsMapping::BalanceSheet
        );
        assert_eq!(AccountType::Equity.default_fs(), FsMapping::BalanceSheet);
    }
}
