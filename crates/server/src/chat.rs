//! Conversational JSON API.
//!
//! - `POST /api/chat` with `{"message": "...", "session_id": "..."}` returns
//!   `{"response": "...", "session_id": "..."}`. Omitting `session_id` starts a new session.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use medstock_agent::{DefaultAgent, SessionId};
use medstock_core::errors::{ApplicationError, InterfaceError};
use medstock_db::SqlInventoryRepository;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ChatState {
    agent: Arc<DefaultAgent<SqlInventoryRepository>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatError {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

pub fn router(agent: Arc<DefaultAgent<SqlInventoryRepository>>) -> Router {
    Router::new().route("/api/chat", post(chat)).with_state(ChatState { agent })
}

async fn chat(
    State(state): State<ChatState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ChatError>)> {
    let correlation_id = Uuid::new_v4().simple().to_string();

    let message = body.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        let error = ApplicationError::InvalidInput("message must not be empty".to_string())
            .into_interface(correlation_id);
        warn!(
            event_name = "server.chat.rejected",
            correlation_id = %error.correlation_id(),
            error = %error,
            "chat request rejected"
        );
        return Err(interface_error(error));
    }

    let session_id = body
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(SessionId::new)
        .unwrap_or_else(|| SessionId::new(Uuid::new_v4().to_string()));

    let response = state.agent.process_utterance(&session_id, message).await;
    info!(
        event_name = "server.chat.replied",
        correlation_id = %correlation_id,
        session_id = %session_id,
        "chat reply sent"
    );

    Ok(Json(ChatResponse { response, session_id: session_id.0 }))
}

fn interface_error(error: InterfaceError) -> (StatusCode, Json<ChatError>) {
    let status = match &error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let detail = match &error {
        InterfaceError::BadRequest { message, .. }
        | InterfaceError::ServiceUnavailable { message, .. }
        | InterfaceError::Internal { message, .. } => message.clone(),
    };
    (
        status,
        Json(ChatError {
            error: error.user_message().to_string(),
            detail,
            correlation_id: error.correlation_id().to_string(),
        }),
    )
}
