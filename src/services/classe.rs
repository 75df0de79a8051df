//! Classe services - Gestione delle classi

use crate::core::{AppError, AppState, Json, Path, Query, require_kind};
use crate::dtos::{ClasseDTO, ClasseListQuery, CreateClasseDTO, Page, Pagination, UpdateClasseDTO, UserDTO};
use crate::entities::{Account, UserKind};
use crate::repositories::{Create, Delete, Paginate, Read, Update};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[instrument(skip(state))]
pub async fn list_classes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClasseListQuery>,
) -> Result<Json<Page<ClasseDTO>>, AppError> {
    let pagination = Pagination::new(params.page, params.limit);
    let (classes, total) = state.classe.paginate(&params, pagination).await?;
    Ok(Json(Page::new(classes, total, pagination).map(ClasseDTO::from)))
}

#[instrument(skip(state))]
pub async fn get_classe(
    State(state): State<Arc<AppState>>,
    Path(classe_id): Path<i32>,
) -> Result<Json<ClasseDTO>, AppError> {
    let classe = state
        .classe
        .read(&classe_id)
        .await?
        .ok_or_else(|| AppError::not_found("Class not found"))?;

    let mut dto = ClasseDTO::from(classe);
    dto.student_count = Some(state.student.count_by_classe(&classe_id).await?);
    Ok(Json(dto))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn list_classe_students(
    State(state): State<Arc<AppState>>,
    Path(classe_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<Vec<UserDTO>>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator, UserKind::Teacher])?;

    if state.classe.read(&classe_id).await?.is_none() {
        return Err(AppError::not_found("Class not found"));
    }
    let students = state.student.find_many_by_classe(&classe_id).await?;
    Ok(Json(students.into_iter().map(UserDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn create_classe(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<CreateClasseDTO>,
) -> Result<impl IntoResponse, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;
    body.validate()?;

    if state.classe.find_by_name(&body.name).await?.is_some() {
        warn!("Class name {} already used", body.name);
        return Err(AppError::conflict("Class name already exists"));
    }

    let classe = state.classe.create(&body).await?;
    info!("Class {} created", classe.classe_id);
    Ok((StatusCode::CREATED, Json(ClasseDTO::from(classe))))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn update_classe(
    State(state): State<Arc<AppState>>,
    Path(classe_id): Path<i32>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<UpdateClasseDTO>,
) -> Result<Json<ClasseDTO>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;
    body.validate()?;

    // un nome già usato da un'altra classe viola il vincolo UNIQUE -> 409
    let classe = state.classe.update(&classe_id, &body).await?;
    Ok(Json(ClasseDTO::from(classe)))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn delete_classe(
    State(state): State<Arc<AppState>>,
    Path(classe_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<impl IntoResponse, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;

    if state.classe.read(&classe_id).await?.is_none() {
        return Err(AppError::not_found("Class not found"));
    }

    let students = state.student.count_by_classe(&classe_id).await?;
    if students > 0 {
        warn!("Class {} still has {} students", classe_id, students);
        return Err(AppError::conflict("Class still has students")
            .with_details(format!("{} students are assigned to this class", students)));
    }

    state.classe.delete(&classe_id).await?;
    info!("Class {} deleted", classe_id);
    Ok(StatusCode::NO_CONTENT)
}
