//! User services - Gestione utenti dei quattro tipi tramite un'unica superficie

use crate::core::{AppError, AppState, Json, Path, Query, require_kind};
use crate::dtos::{
    CreateUserDTO, NewAccountDTO, NewParentDTO, NewStudentDTO, NewTeacherDTO, Page, Pagination,
    UpdateUserDTO, UserDTO, UserListQuery, UserSummaryDTO,
};
use crate::entities::{Account, UserKind, UserRef, hash_password};
use crate::repositories::{Create, Read, Update};
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

/// Converte il segmento `{type}` della URL in un `UserRef`
pub(crate) fn parse_user_path(kind: &str, id: i32) -> Result<UserRef, AppError> {
    let kind: UserKind = kind.parse().map_err(|e: crate::entities::enums::UnknownUserKind| {
        AppError::bad_request("Unknown user type").with_details(e.to_string())
    })?;
    Ok(UserRef::new(kind, id))
}

/// Profilo completo letto dalla tabella indicata dal tipo
pub(crate) async fn fetch_profile(state: &AppState, user: &UserRef) -> Result<Option<UserDTO>, AppError> {
    let profile = match *user {
        UserRef::Administrator(id) => state.administrator.read(&id).await?.map(UserDTO::from),
        UserRef::Teacher(id) => state.teacher.read(&id).await?.map(UserDTO::from),
        UserRef::Student(id) => state.student.read(&id).await?.map(UserDTO::from),
        UserRef::Parent(id) => state.parent.read(&id).await?.map(UserDTO::from),
    };
    Ok(profile)
}

/// Aggiornamento parziale sulla tabella giusta; la password deve essere già hashata
pub(crate) async fn update_account(
    state: &AppState,
    user: &UserRef,
    changes: &UpdateUserDTO,
) -> Result<UserDTO, AppError> {
    let profile = match *user {
        UserRef::Administrator(id) => UserDTO::from(state.administrator.update(&id, changes).await?),
        UserRef::Teacher(id) => UserDTO::from(state.teacher.update(&id, changes).await?),
        UserRef::Student(id) => UserDTO::from(state.student.update(&id, changes).await?),
        UserRef::Parent(id) => UserDTO::from(state.parent.update(&id, changes).await?),
    };
    Ok(profile)
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserListQuery>, // /users?type=teacher&search=dup&page=1
    Extension(current_user): Extension<Account>,
) -> Result<Json<Page<UserSummaryDTO>>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;
    let pagination = Pagination::new(params.page, params.limit);

    let (accounts, total) = state
        .directory
        .list(params.kind, params.search.as_deref(), pagination)
        .await?;
    debug!("Listed {} of {} users", accounts.len(), total);

    Ok(Json(
        Page::new(accounts, total, pagination).map(UserSummaryDTO::from),
    ))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user, kind = %body.kind))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<CreateUserDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Solo gli amministratori creano utenti
    require_kind(&current_user, &[UserKind::Administrator])?;
    // 2. Validare il DTO (email, password, nomi)
    body.validate()?;

    // 3. L'email è unica su tutte e quattro le tabelle
    if state.directory.email_taken(&body.email, None).await? {
        warn!("Email already in use");
        return Err(AppError::conflict("Email already exists"));
    }

    // 4. Hash della password e inserimento nella tabella del tipo richiesto
    let account = NewAccountDTO {
        email: body.email,
        password: hash_password(&body.password)?,
        firstname: body.firstname,
        lastname: body.lastname,
        created_at: Utc::now(),
    };

    let created = match body.kind {
        UserKind::Administrator => UserDTO::from(state.administrator.create(&account).await?),
        UserKind::Teacher => UserDTO::from(
            state
                .teacher
                .create(&NewTeacherDTO {
                    account,
                    subject: body.subject,
                })
                .await?,
        ),
        UserKind::Student => UserDTO::from(
            state
                .student
                .create(&NewStudentDTO {
                    account,
                    birth_date: body.birth_date,
                    classe_id: body.classe_id,
                    parent_id: body.parent_id,
                })
                .await?,
        ),
        UserKind::Parent => UserDTO::from(
            state
                .parent
                .create(&NewParentDTO {
                    account,
                    phone: body.phone,
                })
                .await?,
        ),
    };

    info!("Created {} {}", created.kind, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i32)>, // /users/{type}/{id}
) -> Result<Json<UserDTO>, AppError> {
    let user = parse_user_path(&kind, id)?;
    let profile = fetch_profile(&state, &user)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(profile))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i32)>,
    Extension(current_user): Extension<Account>,
    Json(mut body): Json<UpdateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    let user = parse_user_path(&kind, id)?;
    body.validate()?;

    // Un utente può cambiare solo il proprio nome; il resto è riservato agli amministratori
    let is_admin = current_user.kind() == UserKind::Administrator;
    if !is_admin && !(current_user.user == user && body.only_names()) {
        warn!("User {} cannot update {}", current_user.user, user);
        return Err(AppError::forbidden("You cannot update this user"));
    }

    if fetch_profile(&state, &user).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    if let Some(email) = &body.email {
        if state.directory.email_taken(email, Some(user)).await? {
            return Err(AppError::conflict("Email already exists"));
        }
    }

    if let Some(password) = body.password.take() {
        body.password = Some(hash_password(&password)?);
    }

    let updated = update_account(&state, &user, &body).await?;
    info!("User {} updated", user);
    Ok(Json(updated))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i32)>,
    Extension(current_user): Extension<Account>,
) -> Result<impl IntoResponse, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;
    let user = parse_user_path(&kind, id)?;

    if current_user.user == user {
        return Err(AppError::bad_request("You cannot delete your own account"));
    }

    // Riga utente e riferimenti polimorfici spariscono insieme (404 se assente)
    state.directory.delete_user(&user).await?;

    info!("User {} deleted", user);
    Ok(StatusCode::NO_CONTENT)
}
