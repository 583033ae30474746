use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("GL account '{gl_account}' not found in chart of accounts")]
    UnresolvedAccount { gl_account: String },

    #[error("Unbalanced postings for document {source_doc_id}: debits {debits} != credits {credits}")]
    Imbalance {
        source_doc_id: String,
        debits: Decimal,
        credits: Decimal,
    },

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Store error: {0}")]
    Store(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Single-message validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            errors: vec![message.into()],
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}
