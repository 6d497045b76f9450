//! Intake bot
//!
//! Collects a name and an email address from chat users over a short
//! dialogue and stores each completed pair as a record.

mod api;
mod config;
mod db;
mod runtime;
mod session_store;
mod state_machine;
mod telegram;

use api::{create_router, AppState};
use config::Config;
use db::UserDatabase;
use runtime::{run_polling, DatabaseSink, ProductionManager};
use session_store::InMemorySessionStore;
use std::sync::Arc;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_bot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env()?;

    // Connection is deferred until the first record is written
    let db = UserDatabase::new(&config.store_uri);
    tracing::info!(path = %db.path(), "Using record store");

    let client = Arc::new(TelegramClient::new(
        &config.bot_token,
        config.api_base.as_deref(),
        config.poll_timeout,
    )?);

    let manager = Arc::new(ProductionManager::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(DatabaseSink::new(db.clone())),
        client.clone(),
    ));

    let cancel = CancellationToken::new();
    let poller = {
        let manager = manager.clone();
        let triggers = config.triggers.clone();
        let cancel = cancel.clone();
        let poll_timeout = config.poll_timeout;
        tokio::spawn(async move {
            run_polling(client.as_ref(), manager.as_ref(), &triggers, poll_timeout, cancel).await;
        })
    };

    let app = create_router(AppState::new(manager.clone(), db)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "Bot is running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    cancel.cancel();
    if let Err(e) = poller.await {
        tracing::error!(error = %e, "Polling task failed");
    }
    manager.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
