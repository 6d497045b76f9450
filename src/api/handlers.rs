//! HTTP request handlers

use super::types::HealthResponse;
use super::AppState;
use axum::{extract::State, routing::get, Json, Router};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

async fn root() -> &'static str {
    "Bot is running"
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let active_sessions = state.manager.sessions().len().await;
    let conversations = state.manager.conversation_count().await;

    let db = state.db.clone();
    let records = match tokio::task::spawn_blocking(move || db.count_users()).await {
        Ok(Ok(count)) => Some(count),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Record store unavailable");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Record count task failed");
            None
        }
    };

    Json(HealthResponse {
        status: if records.is_some() { "ok" } else { "degraded" },
        active_sessions,
        conversations,
        records,
    })
}

async fn get_version() -> &'static str {
    concat!("intake-bot ", env!("CARGO_PKG_VERSION"))
}
