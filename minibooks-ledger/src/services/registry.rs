//! Chart of accounts registry collaborator and per-operation resolver.

use crate::models::Account;
use crate::services::normalize::normalize;
use async_trait::async_trait;
use minibooks_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

/// Chart of accounts registry. Read-many, write-occasionally; the engines
/// take a fresh snapshot per operation instead of caching across calls.
#[async_trait]
pub trait AccountRegistry: Send + Sync {
    async fn list_accounts(&self, scope_id: Uuid) -> Result<Vec<Account>, AppError>;

    /// Insert or replace an account. The display name must stay unique per
    /// scope after normalization.
    async fn upsert_account(&self, account: Account) -> Result<Account, AppError>;

    /// Remove an account. Postings referencing it are left in place and
    /// surface as unclassified on reports.
    async fn delete_account(&self, scope_id: Uuid, account_id: Uuid) -> Result<bool, AppError>;
}

/// In-memory account registry.
#[derive(Default)]
pub struct MemoryAccountRegistry {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryAccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRegistry for MemoryAccountRegistry {
    #[instrument(skip(self), fields(scope_id = %scope_id))]
    async fn list_accounts(&self, scope_id: Uuid) -> Result<Vec<Account>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .filter(|a| a.scope_id == scope_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self, account), fields(scope_id = %account.scope_id, gl_account = %account.gl_account))]
    async fn upsert_account(&self, account: Account) -> Result<Account, AppError> {
        let mut accounts = self.accounts.write().await;

        let normalized = normalize(&account.gl_account);
        let taken = accounts.iter().any(|existing| {
            existing.scope_id == account.scope_id
                && existing.account_id != account.account_id
                && normalize(&existing.gl_account) == normalized
        });
        if taken {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "account named '{}' already exists in this scope",
                account.gl_account
            )));
        }

        match accounts
            .iter_mut()
            .find(|existing| existing.account_id == account.account_id)
        {
            Some(existing) => *existing = account.clone(),
            None => accounts.push(account.clone()),
        }

        info!(account_id = %account.account_id, "Account upserted");
        Ok(account)
    }

    #[instrument(skip(self), fields(scope_id = %scope_id, account_id = %account_id))]
    async fn delete_account(&self, scope_id: Uuid, account_id: Uuid) -> Result<bool, AppError> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| !(a.scope_id == scope_id && a.account_id == account_id));
        Ok(accounts.len() < before)
    }
}

/// Immutable snapshot of one scope's chart of accounts, keyed by normalized
/// name. Built at the start of each posting or reporting operation.
pub struct AccountResolver {
    by_normalized: HashMap<String, Account>,
}

impl AccountResolver {
    pub async fn snapshot(
        registry: &dyn AccountRegistry,
        scope_id: Uuid,
    ) -> Result<Self, AppError> {
        let accounts = registry.list_accounts(scope_id).await?;
        Ok(Self::from_accounts(accounts))
    }

    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        let by_normalized = accounts
            .into_iter()
            .map(|account| (normalize(&account.gl_account), account))
            .collect();
        Self { by_normalized }
    }

    /// Resolve a free-text GL reference to its canonical account, or `None`
    /// when the reference is unclassified.
    pub fn resolve(&self, name: &str) -> Option<&Account> {
        self.by_normalized.get(&normalize(name))
    }

    pub fn is_empty(&self) -> bool {
        self.by_normalized.is_empty()
    }
}
