//! Tenant webhook-credential store port.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::foundation::{DomainError, TenantId};

/// A tenant's stored webhook credentials.
///
/// The password is wrapped in [`SecretString`] so it never leaks through
/// Debug formatting or logs; the validator exposes it only for the
/// constant-time comparison.
#[derive(Debug, Clone)]
pub struct WebhookCredential {
    pub tenant_id: TenantId,
    pub api_username: String,
    pub api_password: SecretString,
    pub is_active: bool,
}

/// Read-only port for looking up webhook credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the credential rows matching the username, optionally
    /// narrowed by a tenant hint. An empty result means no webhook is
    /// configured for the caller.
    async fn find_credentials(
        &self,
        tenant_hint: Option<TenantId>,
        username: &str,
    ) -> Result<Vec<WebhookCredential>, DomainError>;
}
