//! Webhook credential validation.
//!
//! The webhook authenticates with HTTP Basic credentials checked against the
//! per-tenant credential store. Password comparison is constant-time; a
//! mismatch reveals nothing externally about which part failed (internal
//! logs are more specific). An optional tenant-hint header narrows the
//! lookup when one account runs several webhook configurations.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, ErrorKind, TenantId};
use crate::ports::CredentialStore;

/// Header carrying the optional tenant hint.
pub const TENANT_HINT_HEADER: &str = "x-webhook-account";

/// Parsed HTTP Basic credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parses an `Authorization: Basic <base64>` header value.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the scheme is not Basic, the payload is
    /// not valid base64/UTF-8, or the `user:pass` separator is missing.
    pub fn parse(header: &str) -> Result<Self, DomainError> {
        let encoded = header
            .strip_prefix("Basic ")
            .or_else(|| header.strip_prefix("basic "))
            .ok_or_else(|| unauthorized("authorization scheme is not Basic"))?;

        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| unauthorized("authorization payload is not valid base64"))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| unauthorized("authorization payload is not valid UTF-8"))?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or_else(|| unauthorized("authorization payload has no credential separator"))?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Validates webhook calls against the stored per-tenant credentials.
pub struct CredentialValidator {
    store: Arc<dyn CredentialStore>,
    /// Development-only bypass; ignored outside the development environment
    /// and rejected by config validation in production.
    allow_unauthenticated: bool,
}

impl CredentialValidator {
    pub fn new(store: Arc<dyn CredentialStore>, allow_unauthenticated: bool) -> Self {
        Self {
            store,
            allow_unauthenticated,
        }
    }

    /// Validates the Authorization header and resolves the calling tenant.
    ///
    /// Returns `Ok(None)` only when the development bypass is active and no
    /// credentials were presented.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` on missing/malformed credentials or any mismatch
    /// - `NotFound` when no credential row matches the lookup
    /// - `DatabaseError` when the store itself fails
    pub async fn validate(
        &self,
        authorization: Option<&str>,
        tenant_hint: Option<TenantId>,
    ) -> Result<Option<TenantId>, DomainError> {
        let header = match authorization {
            Some(header) => header,
            None if self.allow_unauthenticated => {
                warn!("webhook accepted without credentials (development bypass)");
                return Ok(tenant_hint);
            }
            None => return Err(unauthorized("missing Authorization header")),
        };

        let credentials = BasicCredentials::parse(header)?;
        let rows = self
            .store
            .find_credentials(tenant_hint, &credentials.username)
            .await?;

        if rows.is_empty() {
            debug!(username = %credentials.username, "no webhook credentials configured");
            return Err(DomainError::not_found("webhook credentials"));
        }

        for row in rows {
            let password_matches = constant_time_eq(
                row.api_password.expose_secret().as_bytes(),
                credentials.password.as_bytes(),
            );
            if !password_matches {
                debug!(tenant_id = %row.tenant_id, "webhook password mismatch");
                continue;
            }
            if !row.is_active {
                debug!(tenant_id = %row.tenant_id, "webhook credentials inactive");
                continue;
            }
            return Ok(Some(row.tenant_id));
        }

        Err(unauthorized("credential mismatch"))
    }
}

fn unauthorized(internal_reason: &str) -> DomainError {
    // The external message is deliberately uniform; the reason only reaches
    // the logs.
    debug!(reason = internal_reason, "webhook authentication failed");
    DomainError::new(ErrorKind::Unauthorized, "invalid webhook credentials")
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the stored
/// password.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::WebhookCredential;
    use async_trait::async_trait;
    use secrecy::SecretString;

    fn encode(username: &str, password: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{}:{}", username, password)))
    }

    struct StaticCredentialStore {
        rows: Vec<WebhookCredential>,
    }

    #[async_trait]
    impl CredentialStore for StaticCredentialStore {
        async fn find_credentials(
            &self,
            tenant_hint: Option<TenantId>,
            username: &str,
        ) -> Result<Vec<WebhookCredential>, DomainError> {
            Ok(self
                .rows
                .iter()
                .filter(|row| row.api_username == username)
                .filter(|row| tenant_hint.map_or(true, |hint| row.tenant_id == hint))
                .cloned()
                .collect())
        }
    }

    fn store_with(rows: Vec<WebhookCredential>) -> Arc<dyn CredentialStore> {
        Arc::new(StaticCredentialStore { rows })
    }

    fn credential(username: &str, password: &str, active: bool) -> WebhookCredential {
        WebhookCredential {
            tenant_id: TenantId::new(),
            api_username: username.to_string(),
            api_password: SecretString::new(password.to_string()),
            is_active: active,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Basic Header Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_valid_basic_header() {
        let parsed = BasicCredentials::parse(&encode("hook-user", "s3cret")).unwrap();
        assert_eq!(parsed.username, "hook-user");
        assert_eq!(parsed.password, "s3cret");
    }

    #[test]
    fn parse_password_containing_colons() {
        let parsed = BasicCredentials::parse(&encode("hook-user", "a:b:c")).unwrap();
        assert_eq!(parsed.password, "a:b:c");
    }

    #[test]
    fn parse_rejects_non_basic_scheme() {
        let err = BasicCredentials::parse("Bearer abc123").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn parse_rejects_invalid_base64() {
        let err = BasicCredentials::parse("Basic not-base-64!!!").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn parse_rejects_missing_separator() {
        let header = format!("Basic {}", BASE64.encode("no-separator"));
        let err = BasicCredentials::parse(&header).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    // ══════════════════════════════════════════════════════════════
    // Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_credentials_resolve_the_tenant() {
        let row = credential("hook-user", "s3cret", true);
        let tenant_id = row.tenant_id;
        let validator = CredentialValidator::new(store_with(vec![row]), false);

        let resolved = validator
            .validate(Some(&encode("hook-user", "s3cret")), None)
            .await
            .unwrap();

        assert_eq!(resolved, Some(tenant_id));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let validator =
            CredentialValidator::new(store_with(vec![credential("hook-user", "s3cret", true)]), false);

        let err = validator
            .validate(Some(&encode("hook-user", "wrong")), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn inactive_credentials_are_unauthorized() {
        let validator = CredentialValidator::new(
            store_with(vec![credential("hook-user", "s3cret", false)]),
            false,
        );

        let err = validator
            .validate(Some(&encode("hook-user", "s3cret")), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn unknown_username_is_not_found() {
        let validator = CredentialValidator::new(store_with(vec![]), false);

        let err = validator
            .validate(Some(&encode("nobody", "s3cret")), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let validator =
            CredentialValidator::new(store_with(vec![credential("hook-user", "s3cret", true)]), false);

        let err = validator.validate(None, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn development_bypass_allows_missing_credentials() {
        let validator = CredentialValidator::new(store_with(vec![]), true);

        let resolved = validator.validate(None, None).await.unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn bypass_does_not_skip_validation_of_presented_credentials() {
        let validator =
            CredentialValidator::new(store_with(vec![credential("hook-user", "s3cret", true)]), true);

        let err = validator
            .validate(Some(&encode("hook-user", "wrong")), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn tenant_hint_narrows_the_lookup() {
        let row_a = credential("hook-user", "s3cret", true);
        let row_b = credential("hook-user", "other-pass", true);
        let tenant_b = row_b.tenant_id;
        let validator = CredentialValidator::new(store_with(vec![row_a, row_b]), false);

        let resolved = validator
            .validate(Some(&encode("hook-user", "other-pass")), Some(tenant_b))
            .await
            .unwrap();

        assert_eq!(resolved, Some(tenant_b));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_eq_equal_values() {
        assert!(constant_time_eq(b"secret", b"secret"));
    }

    #[test]
    fn constant_time_eq_different_values() {
        assert!(!constant_time_eq(b"secret", b"secreT"));
    }

    #[test]
    fn constant_time_eq_different_lengths() {
        assert!(!constant_time_eq(b"secret", b"secrets"));
    }

    #[test]
    fn constant_time_eq_empty_slices() {
        assert!(constant_time_eq(b"", b""));
    }
}
