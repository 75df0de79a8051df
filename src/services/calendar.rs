//! Calendar services - Eventi del calendario scolastico

use crate::core::{AppError, AppState, Json, Path, Query, require_kind};
use crate::dtos::{CalendarQuery, CreateEventDTO, NewEventDTO, UpdateEventDTO};
use crate::entities::{Account, CalendarEvent, UserKind};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

/// L'autore dell'evento oppure un amministratore
async fn find_editable_event(
    state: &AppState,
    account: &Account,
    event_id: i32,
) -> Result<CalendarEvent, AppError> {
    let event = state
        .calendar
        .read(&event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    if account.kind() != UserKind::Administrator && event.created_by != account.user {
        warn!("User {} is not the author of event {}", account.user, event_id);
        return Err(AppError::forbidden("Only the author can modify this event"));
    }
    Ok(event)
}

#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CalendarQuery>, // /calendar?from=...&to=...
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let events = state.calendar.find_window(&params).await?;
    Ok(Json(events))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<CreateEventDTO>,
) -> Result<impl IntoResponse, AppError> {
    require_kind(&current_user, &[UserKind::Administrator, UserKind::Teacher])?;
    body.validate()?;

    if let Some(classe_id) = body.classe_id {
        if state.classe.read(&classe_id).await?.is_none() {
            return Err(AppError::not_found("Class not found"));
        }
    }

    let event = state
        .calendar
        .create(&NewEventDTO {
            title: body.title,
            description: body.description,
            starts_at: body.starts_at,
            ends_at: body.ends_at,
            classe_id: body.classe_id,
            created_by: current_user.user,
        })
        .await?;

    info!("Event {} created", event.event_id);
    Ok((StatusCode::CREATED, Json(event)))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i32>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<UpdateEventDTO>,
) -> Result<Json<CalendarEvent>, AppError> {
    body.validate()?;
    let current = find_editable_event(&state, &current_user, event_id).await?;

    let starts_at = body.starts_at.unwrap_or(current.starts_at);
    let ends_at = body.ends_at.unwrap_or(current.ends_at);
    if starts_at > ends_at {
        return Err(AppError::bad_request("starts_at must not follow ends_at"));
    }

    let event = state.calendar.update(&event_id, &body).await?;
    Ok(Json(event))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<impl IntoResponse, AppError> {
    find_editable_event(&state, &current_user, event_id).await?;
    state.calendar.delete(&event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
