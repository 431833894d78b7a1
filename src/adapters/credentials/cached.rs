//! Short-TTL caching decorator over a credential store.
//!
//! Webhook bursts hit the credential lookup once per request; a small
//! time-boxed cache absorbs that without holding credentials for long. The
//! cache is an explicitly constructed object owned by the HTTP state, never
//! a process-wide static, so entries cannot leak across differently
//! configured routers and a restart always starts cold.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TenantId};
use crate::ports::{CredentialStore, WebhookCredential};

type CacheKey = (Option<TenantId>, String);

struct CacheEntry {
    rows: Vec<WebhookCredential>,
    fetched_at: Instant,
}

/// Caching decorator for a [`CredentialStore`].
pub struct CachedCredentialStore {
    inner: Arc<dyn CredentialStore>,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl CachedCredentialStore {
    pub fn new(inner: Arc<dyn CredentialStore>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CredentialStore for CachedCredentialStore {
    async fn find_credentials(
        &self,
        tenant_hint: Option<TenantId>,
        username: &str,
    ) -> Result<Vec<WebhookCredential>, DomainError> {
        let key: CacheKey = (tenant_hint, username.to_string());

        {
            let entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get(&key) {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(entry.rows.clone());
                }
            }
        }

        let rows = self.inner.find_credentials(tenant_hint, username).await?;

        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        entries.insert(
            key,
            CacheEntry {
                rows: rows.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(rows)
    }
}
