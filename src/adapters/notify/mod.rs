//! Notification dispatcher adapters.
//!
//! The dispatcher is a fire-and-forget collaborator: the logging adapter
//! just records the event, the HTTP adapter forwards it to a configured
//! endpoint, and the in-memory adapter captures it for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::{DomainError, ErrorKind};
use crate::ports::{DonationNotification, NotificationDispatcher};

/// Dispatcher that records notifications in the structured log only.
///
/// The default when no notification endpoint is configured.
#[derive(Default)]
pub struct LoggingNotificationDispatcher;

impl LoggingNotificationDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for LoggingNotificationDispatcher {
    async fn dispatch(&self, notification: DonationNotification) -> Result<(), DomainError> {
        info!(
            donation_id = %notification.donation_id,
            amount = %notification.amount,
            donation_type = %notification.donation_type,
            donor = notification.donor_name.as_deref().unwrap_or("anonymous"),
            "donation notification"
        );
        Ok(())
    }
}

/// Dispatcher that POSTs the notification to an HTTP endpoint.
pub struct HttpNotificationDispatcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotificationDispatcher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| {
                DomainError::new(
                    ErrorKind::ConfigurationError,
                    format!("failed to build notification client: {}", err),
                )
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl NotificationDispatcher for HttpNotificationDispatcher {
    async fn dispatch(&self, notification: DonationNotification) -> Result<(), DomainError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&notification)
            .send()
            .await
            .map_err(|err| {
                DomainError::new(
                    ErrorKind::ServerError,
                    format!("notification dispatch failed: {}", err),
                )
            })?;

        if !response.status().is_success() {
            return Err(DomainError::new(
                ErrorKind::ServerError,
                format!("notification endpoint returned {}", response.status()),
            ));
        }
        Ok(())
    }
}

/// Dispatcher that captures notifications in memory for tests.
#[derive(Default)]
pub struct InMemoryNotificationDispatcher {
    dispatched: Mutex<Vec<DonationNotification>>,
}

impl InMemoryNotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatched(&self) -> Vec<DonationNotification> {
        self.dispatched.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryNotificationDispatcher {
    async fn dispatch(&self, notification: DonationNotification) -> Result<(), DomainError> {
        self.dispatched.lock().unwrap().push(notification);
        Ok(())
    }
}
