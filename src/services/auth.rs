//! Auth services - Login, profilo corrente e cambio password

use crate::core::{AppError, AppState, Json, encode_jwt};
use crate::core::auth::TOKEN_LIFETIME_HOURS;
use crate::dtos::{ChangePasswordDTO, LoginDTO, LoginResponseDTO, UpdateUserDTO, UserDTO};
use crate::entities::{Account, hash_password};
use crate::services::user::{fetch_profile, update_account};
use axum::{
    Extension,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Cercare l'utente per email in tutte le tabelle
    // 2. Email sconosciuta o password errata -> UNAUTHORIZED, senza distinguere i due casi
    let account = match state.directory.find_by_email(&body.email).await? {
        Some(account) if account.verify_password(&body.password) => account,
        _ => {
            warn!("Invalid credentials");
            return Err(AppError::unauthorized("Invalid email or password"));
        }
    };

    // 3. Token JWT con id e tipo dell'utente
    let token = encode_jwt(&account, &state.jwt_secret)?;

    let user = fetch_profile(&state, &account.user)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    // 4. Cookie HttpOnly e header Authorization con lo stesso token
    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        token,
        TOKEN_LIFETIME_HOURS * 60 * 60
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie_value)
            .map_err(|_| AppError::internal_server_error("Invalid token header"))?,
    );
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::internal_server_error("Invalid token header"))?,
    );

    info!("User {} logged in", account.user);
    Ok((StatusCode::OK, headers, Json(LoginResponseDTO { token, user })))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<UserDTO>, AppError> {
    let profile = fetch_profile(&state, &current_user.user)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(profile))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.user))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<ChangePasswordDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    if !current_user.verify_password(&body.current_password) {
        warn!("Wrong current password");
        return Err(AppError::unauthorized("Current password is not correct"));
    }

    let changes = UpdateUserDTO {
        password: Some(hash_password(&body.new_password)?),
        ..Default::default()
    };
    update_account(&state, &current_user.user, &changes).await?;

    info!("Password changed");
    Ok(StatusCode::NO_CONTENT)
}
