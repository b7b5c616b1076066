use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Liveness: 200 while the process is serving.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "medchat-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness. Always 200: without the retrieval pipeline the bot still answers
/// emergency, symptom, advice and greeting messages, so `rag` is reported as
/// `unavailable` rather than failing the probe.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let rag_status = if state.chatbot.rag_available() {
        "ready"
    } else {
        "unavailable"
    };
    let status = if state.chatbot.rag_available() {
        "ready"
    } else {
        "degraded"
    };

    Ok(Json(json!({
        "status": status,
        "service": "medchat-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "router": "ready",
            "rag": rag_status,
        },
        "conversations": state.conversations.conversation_count(),
    })))
}
