//! Conversation services - Conversazioni fra utenti di qualsiasi tipo

use crate::core::{AppError, AppState, Json, Path};
use crate::dtos::{AddParticipantDTO, ConversationDTO, CreateConversationDTO, ParticipantDTO, UserSummaryDTO};
use crate::entities::{Account, Conversation, UserRef};
use crate::repositories::{Delete, Read};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Conversazione con i partecipanti risolti nelle rispettive tabelle
async fn conversation_dto(state: &AppState, conversation: Conversation) -> Result<ConversationDTO, AppError> {
    let participants = state
        .conversation
        .participants(&conversation.conversation_id)
        .await?;
    let refs: Vec<UserRef> = participants.iter().map(|p| p.participant).collect();
    let mut accounts = state.directory.resolve_many(&refs).await?;

    let participants = participants
        .into_iter()
        .map(|p| ParticipantDTO {
            user: accounts.remove(&p.participant).map(UserSummaryDTO::from),
            participant: p.participant,
            joined_at: p.joined_at,
        })
        .collect();
    Ok(ConversationDTO::new(conversation, participants))
}

/// 404 se la conversazione non esiste, 403 se l'utente non vi partecipa
pub(crate) async fn find_joined_conversation(
    state: &AppState,
    conversation_id: i32,
    user: &UserRef,
) -> Result<Conversation, AppError> {
    let conversation = state
        .conversation
        .read(&conversation_id)
        .await?
        .ok_or_else(|| AppError::not_found("Conversation not found"))?;

    if !state.conversation.is_participant(&conversation_id, user).await? {
        warn!("User {} is not a participant of conversation {}", user, conversation_id);
        return Err(AppError::forbidden("You are not a participant of this conversation"));
    }
    Ok(conversation)
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<Vec<ConversationDTO>>, AppError> {
    let conversations = state
        .conversation
        .find_many_by_participant(&current_user.user)
        .await?;
    debug!("Found {} conversations", conversations.len());

    let dtos = try_join_all(
        conversations
            .into_iter()
            .map(|conversation| conversation_dto(&state, conversation)),
    )
    .await?;
    Ok(Json(dtos))
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<CreateConversationDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    // 1. Partecipanti senza duplicati e senza il creatore
    let mut others: Vec<UserRef> = Vec::new();
    for participant in body.participants {
        if participant != current_user.user && !others.contains(&participant) {
            others.push(participant);
        }
    }
    if others.is_empty() {
        return Err(AppError::bad_request("A conversation needs at least one other participant"));
    }

    // 2. Ogni riferimento deve esistere nella tabella del suo tipo
    let resolved = state.directory.resolve_many(&others).await?;
    if let Some(missing) = others.iter().find(|user| !resolved.contains_key(user)) {
        return Err(AppError::not_found("Participant not found").with_details(missing.to_string()));
    }

    // 3. Creare conversazione e partecipanti, creatore incluso
    let mut participants = vec![current_user.user];
    participants.extend(others);
    let conversation = state
        .conversation
        .create_with_participants(body.title.as_deref(), &participants, Utc::now())
        .await?;

    info!("Conversation {} created", conversation.conversation_id);
    Ok((StatusCode::CREATED, Json(conversation_dto(&state, conversation).await?)))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<ConversationDTO>, AppError> {
    let conversation = find_joined_conversation(&state, conversation_id, &current_user.user).await?;
    Ok(Json(conversation_dto(&state, conversation).await?))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user, participant = %body.participant))]
pub async fn add_participant(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<i32>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<AddParticipantDTO>,
) -> Result<impl IntoResponse, AppError> {
    let conversation = find_joined_conversation(&state, conversation_id, &current_user.user).await?;

    if !state.directory.exists(&body.participant).await? {
        return Err(AppError::not_found("Participant not found"));
    }
    if state
        .conversation
        .is_participant(&conversation_id, &body.participant)
        .await?
    {
        return Err(AppError::conflict("User is already a participant"));
    }

    state
        .conversation
        .add_participant(&conversation_id, &body.participant, Utc::now())
        .await?;

    info!("{} added to conversation {}", body.participant, conversation_id);
    Ok((StatusCode::CREATED, Json(conversation_dto(&state, conversation).await?)))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn leave_conversation(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<impl IntoResponse, AppError> {
    find_joined_conversation(&state, conversation_id, &current_user.user).await?;
    state
        .conversation
        .remove_participant(&conversation_id, &current_user.user)
        .await?;

    // l'ultimo che esce chiude la conversazione
    if state.conversation.count_participants(&conversation_id).await? == 0 {
        state.conversation.delete(&conversation_id).await?;
        info!("Conversation {} deleted after the last participant left", conversation_id);
    }
    Ok(StatusCode::NO_CONTENT)
}
