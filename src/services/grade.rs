//! Grade services - Voti con visibilità per tipo di utente

use crate::core::{AppError, AppState, Json, Path, Query, require_kind};
use crate::dtos::{CreateGradeDTO, GradeQuery, NewGradeDTO, Page, Pagination, UpdateGradeDTO};
use crate::entities::{Account, Grade, NotificationKind, UserKind, UserRef};
use crate::repositories::{Create, Delete, Read, Update};
use crate::services::notification::notify;
use crate::services::student::visible_students;
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

/// Amministratori, oppure l'insegnante che ha assegnato il voto
fn ensure_can_edit(account: &Account, grade: &Grade) -> Result<(), AppError> {
    require_kind(account, &[UserKind::Administrator, UserKind::Teacher])?;
    if account.kind() == UserKind::Teacher && grade.teacher_id != Some(account.id()) {
        warn!("Teacher {} did not assign grade {}", account.id(), grade.grade_id);
        return Err(AppError::forbidden("You can only edit the grades you assigned"));
    }
    Ok(())
}

async fn find_grade(state: &AppState, grade_id: i32) -> Result<Grade, AppError> {
    state
        .grade
        .read(&grade_id)
        .await?
        .ok_or_else(|| AppError::not_found("Grade not found"))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn list_grades(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GradeQuery>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<Page<Grade>>, AppError> {
    let pagination = Pagination::new(params.page, params.limit);
    let students = visible_students(&state, &current_user).await?;
    let (grades, total) = state
        .grade
        .paginate_visible(&params, students.as_deref(), pagination)
        .await?;
    Ok(Json(Page::new(grades, total, pagination)))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user, student_id = body.student_id))]
pub async fn create_grade(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<CreateGradeDTO>,
) -> Result<impl IntoResponse, AppError> {
    require_kind(&current_user, &[UserKind::Administrator, UserKind::Teacher])?;
    body.validate()?;

    let student = state
        .student
        .read(&body.student_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;

    // Il voto è sempre attribuito all'insegnante che lo inserisce
    let teacher_id = match current_user.kind() {
        UserKind::Teacher => Some(current_user.id()),
        _ => body.teacher_id,
    };
    if let (UserKind::Administrator, Some(teacher_id)) = (current_user.kind(), teacher_id) {
        if state.teacher.read(&teacher_id).await?.is_none() {
            return Err(AppError::not_found("Teacher not found"));
        }
    }

    let grade = state
        .grade
        .create(&NewGradeDTO {
            student_id: student.id,
            teacher_id,
            subject: body.subject,
            value: body.value,
            max_value: body.max_value.unwrap_or(20.0),
            coefficient: body.coefficient.unwrap_or(1.0),
            comment: body.comment,
            graded_at: Utc::now(),
        })
        .await?;

    notify(
        &state,
        &[UserRef::Student(student.id)],
        NotificationKind::Grade,
        "New grade",
        &format!("{}: {}/{}", grade.subject, grade.value, grade.max_value),
    )
    .await?;

    info!("Grade {} created", grade.grade_id);
    Ok((StatusCode::CREATED, Json(grade)))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn update_grade(
    State(state): State<Arc<AppState>>,
    Path(grade_id): Path<i32>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<UpdateGradeDTO>,
) -> Result<Json<Grade>, AppError> {
    body.validate()?;
    let current = find_grade(&state, grade_id).await?;
    ensure_can_edit(&current_user, &current)?;

    let value = body.value.unwrap_or(current.value);
    let max_value = body.max_value.unwrap_or(current.max_value);
    if max_value <= 0.0 || value < 0.0 || value > max_value {
        return Err(AppError::bad_request("value must be between 0 and max_value"));
    }

    let grade = state.grade.update(&grade_id, &body).await?;
    Ok(Json(grade))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn delete_grade(
    State(state): State<Arc<AppState>>,
    Path(grade_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<impl IntoResponse, AppError> {
    let grade = find_grade(&state, grade_id).await?;
    ensure_can_edit(&current_user, &grade)?;

    state.grade.delete(&grade_id).await?;
    info!("Grade {} deleted", grade_id);
    Ok(StatusCode::NO_CONTENT)
}
