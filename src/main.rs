//! Donorbase server binary.
//!
//! Wires configuration, the PostgreSQL pool, adapters, and the HTTP routers
//! together and serves the API.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use donorbase::adapters::credentials::CachedCredentialStore;
use donorbase::adapters::http::{
    duplicates_router, webhook_router, DuplicatesAppState, WebhookAppState,
};
use donorbase::adapters::notify::{HttpNotificationDispatcher, LoggingNotificationDispatcher};
use donorbase::adapters::postgres::{
    PostgresContactRepository, PostgresCredentialStore, PostgresDonationRepository,
    PostgresDuplicateMatchRepository,
};
use donorbase::config::AppConfig;
use donorbase::ports::{CredentialStore, NotificationDispatcher};

#[tokio::main]
async fn main() {
    let config = AppConfig::load().expect("Failed to load configuration");
    config.validate().expect("Invalid configuration");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to PostgreSQL");

    if config.database.run_migrations {
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("Failed to run database migrations");
        tracing::info!("database migrations applied");
    }

    let credential_store: Arc<dyn CredentialStore> = {
        let store = Arc::new(PostgresCredentialStore::new(pool.clone()));
        let ttl = config.webhook.credential_cache_ttl();
        if ttl > Duration::ZERO {
            Arc::new(CachedCredentialStore::new(store, ttl))
        } else {
            store
        }
    };

    let notification_dispatcher: Arc<dyn NotificationDispatcher> =
        match &config.webhook.notification_endpoint {
            Some(endpoint) => Arc::new(
                HttpNotificationDispatcher::new(endpoint, config.webhook.notification_timeout())
                    .expect("Failed to build notification dispatcher"),
            ),
            None => Arc::new(LoggingNotificationDispatcher::new()),
        };

    let contact_repository = Arc::new(PostgresContactRepository::new(pool.clone()));
    let webhook_state = WebhookAppState {
        credential_store,
        contact_repository: contact_repository.clone(),
        donation_repository: Arc::new(PostgresDonationRepository::new(pool.clone())),
        notification_dispatcher,
        allow_unauthenticated: config.webhook.bypass_active(config.server.environment),
    };

    let duplicates_state = DuplicatesAppState {
        contact_repository,
        duplicate_repository: Arc::new(PostgresDuplicateMatchRepository::new(pool)),
    };

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/webhooks", webhook_router().with_state(webhook_state))
        .nest(
            "/api/duplicates",
            duplicates_router().with_state(duplicates_state),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!("donorbase listening on {}", addr);
    axum::serve(listener, app).await.expect("Server error");
}
