//! Timetable services - Orario settimanale con controllo delle sovrapposizioni

use crate::core::{AppError, AppState, Json, Path, Query, require_kind};
use crate::dtos::{CreateTimetableDTO, TimetableQuery, UpdateTimetableDTO};
use crate::entities::{Account, Timetable, UserKind};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveTime;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

/// 409 se la classe o l'insegnante hanno già uno slot sovrapposto
async fn ensure_free_slot(
    state: &AppState,
    classe_id: i32,
    teacher_id: Option<i32>,
    day_of_week: i32,
    start: NaiveTime,
    end: NaiveTime,
    exclude: Option<i32>,
) -> Result<(), AppError> {
    let conflicts = state
        .timetable
        .find_conflicts(classe_id, teacher_id, day_of_week, start, end, exclude)
        .await?;
    if let Some(conflict) = conflicts.first() {
        warn!("Slot overlaps timetable {}", conflict.timetable_id);
        return Err(AppError::conflict("Overlapping timetable slot").with_details(format!(
            "Overlaps slot {} ({} {}-{})",
            conflict.timetable_id, conflict.subject, conflict.start_time, conflict.end_time
        )));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_timetables(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimetableQuery>,
) -> Result<Json<Vec<Timetable>>, AppError> {
    let slots = state.timetable.find_many(&params).await?;
    Ok(Json(slots))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn create_timetable(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<CreateTimetableDTO>,
) -> Result<impl IntoResponse, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;
    body.validate()?;

    if state.classe.read(&body.classe_id).await?.is_none() {
        return Err(AppError::not_found("Class not found"));
    }
    if let Some(teacher_id) = body.teacher_id {
        if state.teacher.read(&teacher_id).await?.is_none() {
            return Err(AppError::not_found("Teacher not found"));
        }
    }

    ensure_free_slot(
        &state,
        body.classe_id,
        body.teacher_id,
        body.day_of_week,
        body.start_time,
        body.end_time,
        None,
    )
    .await?;

    let slot = state.timetable.create(&body).await?;
    info!("Timetable slot {} created", slot.timetable_id);
    Ok((StatusCode::CREATED, Json(slot)))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn update_timetable(
    State(state): State<Arc<AppState>>,
    Path(timetable_id): Path<i32>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<UpdateTimetableDTO>,
) -> Result<Json<Timetable>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;
    body.validate()?;

    let current = state
        .timetable
        .read(&timetable_id)
        .await?
        .ok_or_else(|| AppError::not_found("Timetable slot not found"))?;

    // Lo slot risultante dopo l'aggiornamento parziale
    let teacher_id = body.teacher_id.or(current.teacher_id);
    let day_of_week = body.day_of_week.unwrap_or(current.day_of_week);
    let start = body.start_time.unwrap_or(current.start_time);
    let end = body.end_time.unwrap_or(current.end_time);
    if start >= end {
        return Err(AppError::bad_request("start_time must precede end_time"));
    }
    if let Some(teacher_id) = body.teacher_id {
        if state.teacher.read(&teacher_id).await?.is_none() {
            return Err(AppError::not_found("Teacher not found"));
        }
    }

    ensure_free_slot(
        &state,
        current.classe_id,
        teacher_id,
        day_of_week,
        start,
        end,
        Some(timetable_id),
    )
    .await?;

    let slot = state.timetable.update(&timetable_id, &body).await?;
    Ok(Json(slot))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn delete_timetable(
    State(state): State<Arc<AppState>>,
    Path(timetable_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<impl IntoResponse, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;
    state.timetable.delete(&timetable_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
