//! Contact model for counterparties.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact kind (customer or vendor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Customer,
    Vendor,
}

impl ContactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
        }
    }
}

impl std::fmt::Display for ContactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal contact record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub contact_id: Uuid,
    pub scope_id: Uuid,
    pub name: String,
    pub kind: ContactKind,
}

impl Contact {
    pub fn new(scope_id: Uuid, name: impl Into<String>, kind: ContactKind) -> Self {
        Self {
            contact_id: Uuid::new_v4(),
            scope_id,
            name: name.into(),
            kind,
        }
    }
}
