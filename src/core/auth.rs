//! Auth - Token JWT, middleware di autenticazione e controllo dei ruoli

use crate::core::{AppError, AppState};
use crate::entities::{Account, UserKind, UserRef};
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub const TOKEN_LIFETIME_HOURS: i64 = 24;

// struct che codifica il contenuto del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i32,
    pub user_type: UserKind,
    pub email: String,
}

impl Claims {
    pub fn user_ref(&self) -> UserRef {
        UserRef::new(self.user_type, self.id)
    }
}

#[instrument(skip(account, secret), fields(user = %account.user))]
pub fn encode_jwt(account: &Account, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let exp = (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    let claims = Claims {
        iat: now.timestamp() as usize,
        exp,
        id: account.id(),
        user_type: account.kind(),
        email: account.email.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .inspect_err(|e| error!("Failed to encode JWT token: {:?}", e))
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    debug!("Decoding JWT token");
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::unauthorized("Invalid authorization header")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden("Please add the JWT token to the header"));
        }
    };

    let mut header = auth_header.split_whitespace();
    let token = match (header.next(), header.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            warn!("Authorization header is not a bearer token");
            return Err(AppError::unauthorized("Invalid authorization header"));
        }
    };

    let token_data = decode_jwt(token, &state.jwt_secret).map_err(|e| {
        warn!("Failed to decode JWT token: {}", e);
        AppError::unauthorized("Unable to decode token")
    })?;

    // L'utente potrebbe essere stato cancellato dopo l'emissione del token
    let user = token_data.claims.user_ref();
    let current_user = match state.directory.resolve(&user).await? {
        Some(account) => {
            info!("User authenticated: {}", account.user);
            account
        }
        None => {
            warn!("User not found in database: {}", user);
            return Err(AppError::unauthorized("You are not an authorized user"));
        }
    };
    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Verifica che l'utente corrente sia di uno dei tipi ammessi
///
/// # Returns
/// * `Ok(())` se il tipo è ammesso
/// * `Err(AppError)` 403 altrimenti
pub fn require_kind(account: &Account, allowed: &[UserKind]) -> Result<(), AppError> {
    if allowed.contains(&account.kind()) {
        return Ok(());
    }
    warn!(
        "User {} has insufficient role, required one of: {:?}",
        account.user, allowed
    );
    Err(AppError::forbidden("Insufficient role").with_details(format!(
        "This action requires one of the following user types: {}",
        allowed
            .iter()
            .map(UserKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(user: UserRef) -> Account {
        Account {
            user,
            email: "someone@school.test".to_string(),
            password: String::new(),
            firstname: "Some".to_string(),
            lastname: "One".to_string(),
        }
    }

    #[test]
    fn token_carries_id_and_type() {
        let token = encode_jwt(&account(UserRef::Parent(4)), "secret").unwrap();
        let data = decode_jwt(&token, "secret").unwrap();
        assert_eq!(data.claims.user_ref(), UserRef::Parent(4));
        assert_eq!(data.claims.email, "someone@school.test");
        assert_eq!(
            data.claims.exp - data.claims.iat,
            (TOKEN_LIFETIME_HOURS * 3600) as usize
        );
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = encode_jwt(&account(UserRef::Teacher(1)), "secret").unwrap();
        assert!(decode_jwt(&token, "other").is_err());
    }

    #[test]
    fn require_kind_rejects_other_types() {
        let teacher = account(UserRef::Teacher(1));
        assert!(require_kind(&teacher, &[UserKind::Administrator, UserKind::Teacher]).is_ok());
        let err = require_kind(&teacher, &[UserKind::Administrator]).unwrap_err();
        assert_eq!(err.status(), http::StatusCode::FORBIDDEN);
    }
}
