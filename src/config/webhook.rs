//! Webhook ingestion configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Webhook configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Accept webhook calls without credentials. Development only; config
    /// validation rejects it in production and the validator ignores it
    /// outside development.
    #[serde(default)]
    pub allow_unauthenticated: bool,

    /// TTL of the in-process credential cache, in seconds. Zero disables
    /// caching.
    #[serde(default = "default_credential_cache_ttl")]
    pub credential_cache_ttl_secs: u64,

    /// Endpoint the notification forwarder POSTs to. Unset means
    /// notifications go to the structured log only.
    #[serde(default)]
    pub notification_endpoint: Option<String>,

    /// Timeout for notification dispatch in seconds.
    #[serde(default = "default_notification_timeout")]
    pub notification_timeout_secs: u64,
}

impl WebhookConfig {
    /// Get the credential cache TTL as a Duration
    pub fn credential_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_cache_ttl_secs)
    }

    /// Get the notification timeout as a Duration
    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }

    /// Whether the development bypass is actually in effect.
    pub fn bypass_active(&self, environment: Environment) -> bool {
        self.allow_unauthenticated && environment == Environment::Development
    }

    /// Validate webhook configuration against the runtime environment
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.allow_unauthenticated && environment == Environment::Production {
            return Err(ValidationError::BypassEnabledInProduction);
        }
        if let Some(endpoint) = &self.notification_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ValidationError::InvalidNotificationEndpoint);
            }
        }
        Ok(())
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            allow_unauthenticated: false,
            credential_cache_ttl_secs: default_credential_cache_ttl(),
            notification_endpoint: None,
            notification_timeout_secs: default_notification_timeout(),
        }
    }
}

fn default_credential_cache_ttl() -> u64 {
    30
}

fn default_notification_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_safe() {
        let config = WebhookConfig::default();
        assert!(!config.allow_unauthenticated);
        assert_eq!(config.credential_cache_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn bypass_is_rejected_in_production() {
        let config = WebhookConfig {
            allow_unauthenticated: true,
            ..Default::default()
        };
        assert!(config.validate(Environment::Production).is_err());
        assert!(config.validate(Environment::Development).is_ok());
    }

    #[test]
    fn bypass_is_inert_outside_development() {
        let config = WebhookConfig {
            allow_unauthenticated: true,
            ..Default::default()
        };
        assert!(config.bypass_active(Environment::Development));
        assert!(!config.bypass_active(Environment::Staging));
        assert!(!config.bypass_active(Environment::Production));
    }

    #[test]
    fn notification_endpoint_must_be_http() {
        let config = WebhookConfig {
            notification_endpoint: Some("ftp://notify.example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate(Environment::Development).is_err());

        let config = WebhookConfig {
            notification_endpoint: Some("https://notify.example.com/hook".to_string()),
            ..Default::default()
        };
        assert!(config.validate(Environment::Development).is_ok());
    }
}
