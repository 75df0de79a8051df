//! Student services - Studenti, assegnazione a classe e genitore, pagella

use crate::core::{AppError, AppState, Json, Path, Query, require_kind};
use crate::dtos::{
    AssignClasseDTO, AssignParentDTO, AttendanceQuery, Page, Pagination, PaginationQuery,
    StudentGradesDTO, StudentListQuery, UserDTO,
};
use crate::entities::{Account, Attendance, Student, UserKind, weighted_average};
use crate::repositories::{Paginate, Read};
use axum::{
    Extension,
    extract::State,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Studenti di cui l'utente può vedere voti e presenze; `None` significa tutti
pub(crate) async fn visible_students(
    state: &AppState,
    account: &Account,
) -> Result<Option<Vec<i32>>, AppError> {
    Ok(match account.kind() {
        UserKind::Administrator | UserKind::Teacher => None,
        UserKind::Student => Some(vec![account.id()]),
        UserKind::Parent => Some(
            state
                .student
                .find_many_by_parent(&account.id())
                .await?
                .into_iter()
                .map(|student| student.id)
                .collect(),
        ),
    })
}

/// Legge lo studente e verifica che l'utente corrente possa vederlo
pub(crate) async fn find_visible_student(
    state: &AppState,
    account: &Account,
    student_id: i32,
) -> Result<Student, AppError> {
    let student = state
        .student
        .read(&student_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;

    let allowed = match account.kind() {
        UserKind::Administrator | UserKind::Teacher => true,
        UserKind::Student => account.id() == student.id,
        UserKind::Parent => student.parent_id == Some(account.id()),
    };
    if !allowed {
        warn!("User {} cannot access student {}", account.user, student_id);
        return Err(AppError::forbidden("You cannot access this student"));
    }
    Ok(student)
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StudentListQuery>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<Page<UserDTO>>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator, UserKind::Teacher])?;
    let pagination = Pagination::new(params.page, params.limit);
    let (students, total) = state.student.paginate(&params, pagination).await?;
    Ok(Json(Page::new(students, total, pagination).map(UserDTO::from)))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<UserDTO>, AppError> {
    let student = find_visible_student(&state, &current_user, student_id).await?;
    Ok(Json(UserDTO::from(student)))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn assign_classe(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i32>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<AssignClasseDTO>,
) -> Result<Json<UserDTO>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;

    if let Some(classe_id) = body.classe_id {
        if state.classe.read(&classe_id).await?.is_none() {
            return Err(AppError::not_found("Class not found"));
        }
    }

    let student = state.student.assign_classe(&student_id, body.classe_id).await?;
    info!("Student {} assigned to class {:?}", student_id, body.classe_id);
    Ok(Json(UserDTO::from(student)))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn assign_parent(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i32>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<AssignParentDTO>,
) -> Result<Json<UserDTO>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;

    if let Some(parent_id) = body.parent_id {
        if state.parent.read(&parent_id).await?.is_none() {
            return Err(AppError::not_found("Parent not found"));
        }
    }

    let student = state.student.assign_parent(&student_id, body.parent_id).await?;
    info!("Student {} linked to parent {:?}", student_id, body.parent_id);
    Ok(Json(UserDTO::from(student)))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn get_student_grades(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<StudentGradesDTO>, AppError> {
    find_visible_student(&state, &current_user, student_id).await?;

    let grades = state.grade.find_many_by_student(&student_id).await?;
    debug!("Found {} grades", grades.len());
    Ok(Json(StudentGradesDTO {
        student_id,
        average: weighted_average(&grades),
        grades,
    }))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn get_student_attendance(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i32>,
    Query(params): Query<PaginationQuery>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<Page<Attendance>>, AppError> {
    find_visible_student(&state, &current_user, student_id).await?;

    let pagination = params.pagination();
    let filter = AttendanceQuery {
        student_id: Some(student_id),
        ..Default::default()
    };
    let (rows, total) = state.attendance.paginate(&filter, pagination).await?;
    Ok(Json(Page::new(rows, total, pagination)))
}
