//! Message services - Messaggi delle conversazioni

use crate::core::{AppError, AppState, Json, Path, Query};
use crate::dtos::{CreateMessageDTO, MessageDTO, MessagesQuery, Page, Pagination, SendMessageDTO, UserSummaryDTO};
use crate::entities::{Account, NotificationKind, UserRef};
use crate::repositories::{Create, Delete, Read};
use crate::services::conversation::find_joined_conversation;
use crate::services::notification::notify;
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

const PREVIEW_CHARS: usize = 100;

fn preview(content: &str) -> String {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    preview
}

#[instrument(skip(state, current_user), fields(user = %current_user.user, conversation_id = params.conversation_id))]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MessagesQuery>, // /messages?conversation_id=1&page=1
    Extension(current_user): Extension<Account>,
) -> Result<Json<Page<MessageDTO>>, AppError> {
    find_joined_conversation(&state, params.conversation_id, &current_user.user).await?;

    let pagination = Pagination::new(params.page, params.limit);
    let (messages, total) = state
        .msg
        .page_by_conversation(&params.conversation_id, pagination)
        .await?;

    // mittenti risolti in parallelo, `null` se cancellati
    let senders: Vec<UserRef> = messages.iter().map(|m| m.sender).collect();
    let accounts = state.directory.resolve_many(&senders).await?;

    Ok(Json(Page::new(messages, total, pagination).map(|message| {
        let sender = accounts.get(&message.sender).cloned().map(UserSummaryDTO::from);
        MessageDTO::new(message, sender)
    })))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user, conversation_id = body.conversation_id))]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<SendMessageDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;
    find_joined_conversation(&state, body.conversation_id, &current_user.user).await?;

    let message = state
        .msg
        .create(&CreateMessageDTO {
            conversation_id: body.conversation_id,
            sender: current_user.user,
            content: body.content,
            created_at: Utc::now(),
        })
        .await?;

    // Notifica a tutti gli altri partecipanti
    let others: Vec<UserRef> = state
        .conversation
        .participants(&body.conversation_id)
        .await?
        .into_iter()
        .map(|p| p.participant)
        .filter(|user| *user != current_user.user)
        .collect();
    notify(
        &state,
        &others,
        NotificationKind::Message,
        &format!("New message from {}", current_user.full_name()),
        &preview(&message.content),
    )
    .await?;

    info!("Message {} sent", message.message_id);
    let sender = UserSummaryDTO::from(current_user);
    Ok((StatusCode::CREATED, Json(MessageDTO::new(message, Some(sender)))))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<impl IntoResponse, AppError> {
    let message = state
        .msg
        .read(&message_id)
        .await?
        .ok_or_else(|| AppError::not_found("Message not found"))?;

    if message.sender != current_user.user {
        warn!("User {} is not the sender of message {}", current_user.user, message_id);
        return Err(AppError::forbidden("Only the sender can delete this message"));
    }

    state.msg.delete(&message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
