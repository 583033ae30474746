//! Contact directory collaborator.

use crate::models::{Contact, ContactKind};
use crate::services::normalize::normalize;
use async_trait::async_trait;
use minibooks_core::error::AppError;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

/// Contact registry consumed by the posting engine to auto-create missing
/// counterparties. Failures here never block a posting operation.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn find_by_name(
        &self,
        scope_id: Uuid,
        name: &str,
        kind: Option<ContactKind>,
    ) -> Result<Option<Contact>, AppError>;

    async fn create(&self, contact: Contact) -> Result<Contact, AppError>;
}

/// In-memory contact directory.
#[derive(Default)]
pub struct MemoryContactDirectory {
    contacts: RwLock<Vec<Contact>>,
}

impl MemoryContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactDirectory for MemoryContactDirectory {
    #[instrument(skip(self), fields(scope_id = %scope_id, name = %name))]
    async fn find_by_name(
        &self,
        scope_id: Uuid,
        name: &str,
        kind: Option<ContactKind>,
    ) -> Result<Option<Contact>, AppError> {
        let normalized = normalize(name);
        let contacts = self.contacts.read().await;
        Ok(contacts
            .iter()
            .find(|c| {
                c.scope_id == scope_id
                    && normalize(&c.name) == normalized
                    && kind.map_or(true, |k| c.kind == k)
            })
            .cloned())
    }

    #[instrument(skip(self, contact), fields(scope_id = %contact.scope_id, name = %contact.name, kind = %contact.kind))]
    async fn create(&self, contact: Contact) -> Result<Contact, AppError> {
        let mut contacts = self.contacts.write().await;
        contacts.push(contact.clone());
        info!(contact_id = %contact.contact_id, "Contact created");
        Ok(contact)
    }
}
