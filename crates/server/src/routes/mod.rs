//! API route handlers
//!
//! - `chat`: the chat endpoints used by the web UI
//! - `health`: liveness and readiness

pub mod chat;
pub mod health;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Service info (GET /)
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Medchat Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "POST /send_message",
            "POST /clear_chat",
            "GET /get_disclaimer",
            "GET /history/{conversation_id}",
            "GET /health",
            "GET /ready"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
