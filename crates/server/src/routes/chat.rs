//! Assistant chat handlers

use axum::{Extension, Json, extract::State, response::IntoResponse};
use deadpool_postgres::Pool;
use health_core::{ChatPrompt, triage};
use serde::{Deserialize, Serialize};

use crate::ai::{Assistant, assistant::CHAT_FALLBACK};
use crate::auth::Claims;
use crate::chat::ChatStore;
use crate::db::UserRepository;
use crate::error::AppError;

const BUSY: &str = "Bot cevabı gelmeden yeni mesaj gönderemezsiniz";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
pub struct ReplyResponse {
    pub reply: String,
}

/// POST /chat - Answer a chat message with profile-aware advice
pub async fn send(
    State(pool): State<Pool>,
    Extension(claims): Extension<Claims>,
    Extension(chats): Extension<ChatStore>,
    Extension(assistant): Extension<Assistant>,
    Json(body): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = claims.username.as_str();
    if chats.is_waiting(username) {
        return Err(AppError::bad_request(BUSY));
    }

    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::bad_request("Mesaj boş olamaz"));
    }

    let turn = chats
        .begin_turn(username, message)
        .map_err(|_| AppError::bad_request(BUSY))?;

    let profile = UserRepository::new(pool)
        .health_profile(claims.user_id)
        .await?;
    let profile_context = profile.context();

    let prompt = ChatPrompt {
        history: turn.history(),
        profile_context: &profile_context,
        message,
    }
    .render();

    let mut reply = String::new();
    if triage::is_dangerous(message) {
        tracing::warn!(username = %username, "Danger words detected in chat message");
        reply.push_str(triage::EMERGENCY_NOTICE);
    }
    reply.push_str(&assistant.ask("chat", &prompt, CHAT_FALLBACK).await);

    turn.finish(&reply);
    Ok(Json(ReplyResponse { reply }))
}

/// GET /history - The caller's conversation so far
pub async fn history(
    Extension(claims): Extension<Claims>,
    Extension(chats): Extension<ChatStore>,
) -> impl IntoResponse {
    Json(chats.history(&claims.username))
}
