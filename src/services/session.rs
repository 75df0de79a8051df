//! Session services - Séance e registrazione presenze in blocco

use crate::core::{AppError, AppState, Json, Path, Query, require_kind};
use crate::dtos::{
    AttendanceEntryDTO, AttendanceErrorDTO, BulkAttendanceResultDTO, CreateSessionDTO, Page,
    Pagination, RecordAttendanceDTO, SessionQuery, UpdateSessionDTO,
};
use crate::entities::{
    Account, Attendance, AttendanceStatus, NotificationKind, Session, UserKind, UserRef,
};
use crate::repositories::{Create, Delete, Paginate, Read, Update};
use crate::services::notification::notify;
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Amministratori sempre, insegnanti solo per le proprie séance
fn ensure_can_manage(account: &Account, session: &Session) -> Result<(), AppError> {
    require_kind(account, &[UserKind::Administrator, UserKind::Teacher])?;
    if account.kind() == UserKind::Teacher && session.teacher_id != Some(account.id()) {
        warn!("Teacher {} does not own session {}", account.id(), session.session_id);
        return Err(AppError::forbidden("You can only manage your own sessions"));
    }
    Ok(())
}

async fn find_session(state: &AppState, session_id: i32) -> Result<Session, AppError> {
    state
        .session
        .read(&session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session not found"))
}

#[instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionQuery>, // /sessions?classe_id=1&from=...&to=...
) -> Result<Json<Page<Session>>, AppError> {
    let pagination = Pagination::new(params.page, params.limit);
    let (sessions, total) = state.session.paginate(&params, pagination).await?;
    Ok(Json(Page::new(sessions, total, pagination)))
}

#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(find_session(&state, session_id).await?))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(mut body): Json<CreateSessionDTO>,
) -> Result<impl IntoResponse, AppError> {
    require_kind(&current_user, &[UserKind::Administrator, UserKind::Teacher])?;
    body.validate()?;

    // Un insegnante crea séance solo a proprio nome
    if current_user.kind() == UserKind::Teacher {
        if body.teacher_id.is_some_and(|id| id != current_user.id()) {
            return Err(AppError::forbidden("You can only create your own sessions"));
        }
        body.teacher_id = Some(current_user.id());
    } else if let Some(teacher_id) = body.teacher_id {
        if state.teacher.read(&teacher_id).await?.is_none() {
            return Err(AppError::not_found("Teacher not found"));
        }
    }

    if state.classe.read(&body.classe_id).await?.is_none() {
        return Err(AppError::not_found("Class not found"));
    }

    let session = state.session.create(&body).await?;
    info!("Session {} created", session.session_id);
    Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn update_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<UpdateSessionDTO>,
) -> Result<Json<Session>, AppError> {
    body.validate()?;
    let current = find_session(&state, session_id).await?;
    ensure_can_manage(&current_user, &current)?;

    if current_user.kind() == UserKind::Teacher
        && body.teacher_id.is_some_and(|id| id != current_user.id())
    {
        return Err(AppError::forbidden("You cannot hand a session to another teacher"));
    }

    let starts_at = body.starts_at.unwrap_or(current.starts_at);
    let ends_at = body.ends_at.unwrap_or(current.ends_at);
    if starts_at >= ends_at {
        return Err(AppError::bad_request("starts_at must precede ends_at"));
    }

    let session = state.session.update(&session_id, &body).await?;
    Ok(Json(session))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state, session_id).await?;
    ensure_can_manage(&current_user, &session)?;

    state.session.delete(&session_id).await?;
    info!("Session {} deleted", session_id);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn get_session_attendance(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator, UserKind::Teacher])?;
    find_session(&state, session_id).await?;
    let rows = state.attendance.find_many_by_session(&session_id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user, entries = body.len()))]
pub async fn record_attendance(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<Vec<AttendanceEntryDTO>>,
) -> Result<Json<BulkAttendanceResultDTO>, AppError> {
    let session = find_session(&state, session_id).await?;
    ensure_can_manage(&current_user, &session)?;

    let mut result = BulkAttendanceResultDTO::default();
    let recorded_at = Utc::now();

    // Ogni riga è indipendente: un errore non blocca le altre
    for entry in body {
        let reject = |error: &str| AttendanceErrorDTO {
            student_id: entry.student_id,
            error: error.to_string(),
        };

        if entry.validate().is_err() {
            result.errors.push(reject("Invalid entry"));
            continue;
        }

        let student = match state.student.read(&entry.student_id).await {
            Ok(Some(student)) => student,
            Ok(None) => {
                result.errors.push(reject("Unknown student"));
                continue;
            }
            Err(e) => {
                warn!("Could not load student {}: {}", entry.student_id, e);
                result.errors.push(reject("Could not record attendance"));
                continue;
            }
        };
        if student.classe_id != Some(session.classe_id) {
            result
                .errors
                .push(reject("Student is not enrolled in the session's class"));
            continue;
        }

        let attendance = match state
            .attendance
            .upsert(&RecordAttendanceDTO {
                session_id,
                student_id: student.id,
                status: entry.status,
                comment: entry.comment.clone(),
                recorded_at,
            })
            .await
        {
            Ok(attendance) => attendance,
            Err(e) => {
                warn!("Could not record attendance of student {}: {}", student.id, e);
                result.errors.push(reject("Could not record attendance"));
                continue;
            }
        };

        // Assenze e ritardi vengono segnalati al genitore
        if let (true, Some(parent_id)) = (attendance.status.notifies_parent(), student.parent_id) {
            let status = match attendance.status {
                AttendanceStatus::Late => "late",
                _ => "absent",
            };
            // la presenza resta registrata anche se la notifica fallisce
            if let Err(e) = notify(
                &state,
                &[UserRef::Parent(parent_id)],
                NotificationKind::Attendance,
                "Attendance",
                &format!(
                    "{} {} was {} for {} on {}",
                    student.firstname,
                    student.lastname,
                    status,
                    session.subject,
                    session.starts_at.format("%Y-%m-%d %H:%M")
                ),
            )
            .await
            {
                warn!("Could not notify parent {}: {:?}", parent_id, e);
            }
        }

        result.recorded.push(attendance);
    }

    debug!(
        "Recorded {} attendances, {} errors",
        result.recorded.len(),
        result.errors.len()
    );
    Ok(Json(result))
}
