//! PostgreSQL implementation of CredentialStore.

use async_trait::async_trait;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, TenantId};
use crate::ports::{CredentialStore, WebhookCredential};

/// PostgreSQL implementation of the CredentialStore port.
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_credentials(
        &self,
        tenant_hint: Option<TenantId>,
        username: &str,
    ) -> Result<Vec<WebhookCredential>, DomainError> {
        let rows: Vec<(Uuid, String, String, bool)> = sqlx::query_as(
            r#"
            SELECT user_id, api_username, api_password, is_active
            FROM webhook_credentials
            WHERE api_username = $1
              AND ($2::uuid IS NULL OR user_id = $2)
            "#,
        )
        .bind(username)
        .bind(tenant_hint.map(|t| *t.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(rows
            .into_iter()
            .map(|(user_id, api_username, api_password, is_active)| WebhookCredential {
                tenant_id: TenantId::from_uuid(user_id),
                api_username,
                api_password: SecretString::new(api_password),
                is_active,
            })
            .collect())
    }
}
