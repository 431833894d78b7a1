//! In-memory implementation of CredentialStore.

use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::foundation::{DomainError, TenantId};
use crate::ports::{CredentialStore, WebhookCredential};

/// In-memory implementation of the CredentialStore port.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    rows: Mutex<Vec<WebhookCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a credential row; returns the tenant id it was assigned.
    pub fn add(&self, username: &str, password: &str, is_active: bool) -> TenantId {
        let tenant_id = TenantId::new();
        self.rows.lock().unwrap().push(WebhookCredential {
            tenant_id,
            api_username: username.to_string(),
            api_password: SecretString::new(password.to_string()),
            is_active,
        });
        tenant_id
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_credentials(
        &self,
        tenant_hint: Option<TenantId>,
        username: &str,
    ) -> Result<Vec<WebhookCredential>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.api_username == username)
            .filter(|row| tenant_hint.map_or(true, |hint| row.tenant_id == hint))
            .cloned()
            .collect())
    }
}
