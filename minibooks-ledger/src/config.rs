//! Configuration for the ledger engine.

use minibooks_core::config::Config as CommonConfig;
use minibooks_core::error::AppError;
use serde::Deserialize;

/// Engine settings. The receivable/payable names designate the control
/// accounts invoices and bills balance against; both must exist in the
/// chart of accounts before those documents can be posted.
#[derive(Debug, Deserialize, Clone)]
pub struct LedgerSettings {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default = "default_receivable_account")]
    pub receivable_account: String,
    #[serde(default = "default_payable_account")]
    pub payable_account: String,
}

fn default_receivable_account() -> String {
    "Accounts Receivable".to_string()
}

fn default_payable_account() -> String {
    "Accounts Payable".to_string()
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            common: CommonConfig::default(),
            receivable_account: default_receivable_account(),
            payable_account: default_payable_account(),
        }
    }
}

impl LedgerSettings {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
