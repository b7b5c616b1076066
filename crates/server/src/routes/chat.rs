//! Chat endpoints.
//!
//! Request bodies are lenient: missing fields fall back to an empty message and
//! the `"default"` conversation, which is what the web UI relies on.

use crate::conversation::{ChatTurn, DEFAULT_CONVERSATION_ID};
use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use medchat::ResponseType;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

fn default_conversation_id() -> String {
    DEFAULT_CONVERSATION_ID.to_string()
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_conversation_id")]
    pub conversation_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BotResponse {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: ResponseType,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub success: bool,
    pub response: BotResponse,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ClearChatRequest {
    #[serde(default = "default_conversation_id")]
    pub conversation_id: String,
}

/// POST /send_message
pub async fn send_message(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(req) = payload?;

    // Emergency keywords are checked on the full text, before the length cap.
    let limit = state.config.max_message_chars;
    if req.message.chars().count() > limit {
        if !state.chatbot.is_emergency(&req.message) {
            return Err(ServerError::MessageTooLong(limit));
        }
        tracing::warn!(
            conversation_id = %req.conversation_id,
            limit,
            "over-long message contains emergency keywords"
        );
    }

    let reply = state.chatbot.respond(&req.message).await;
    tracing::info!(
        conversation_id = %req.conversation_id,
        response_type = %reply.kind,
        sources = reply.sources.len(),
        "message answered"
    );

    state.conversations.record_exchange(
        &req.conversation_id,
        ChatTurn::user(req.message.as_str()),
        ChatTurn::bot(&reply),
    );

    Ok(Json(SendMessageResponse {
        success: true,
        response: BotResponse {
            text: reply.text,
            kind: reply.kind,
            timestamp: reply.timestamp,
        },
        conversation_id: req.conversation_id,
    }))
}

/// POST /clear_chat
pub async fn clear_chat(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ClearChatRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(req) = payload?;
    let removed = state.conversations.clear(&req.conversation_id);
    tracing::debug!(conversation_id = %req.conversation_id, removed, "conversation cleared");
    Ok(Json(json!({ "success": true })))
}

/// GET /get_disclaimer
pub async fn get_disclaimer(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "text": state.chatbot.knowledge().disclaimer,
        "type": "disclaimer",
    }))
}

/// GET /history/{conversation_id}
pub async fn get_history(
    State(state): State<Arc<ServerState>>,
    Path(conversation_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let messages = state.conversations.history(&conversation_id);
    Ok(Json(json!({
        "conversation_id": conversation_id,
        "messages": messages,
    })))
}
