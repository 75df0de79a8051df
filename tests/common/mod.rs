#![allow(dead_code)]

use axum_test::TestServer;
use axum_test::http::HeaderName;
use school_server::core::{AppState, Claims};
use school_server::entities::UserRef;
use sqlx::SqlitePool;
use std::sync::Arc;

pub const TEST_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Password di tutti gli account dei fixtures
pub const FIXTURE_PASSWORD: &str = "Password123";

/// Crea un AppState per i test
///
/// # Arguments
/// * `pool` - Connection pool SQLite creato da `#[sqlx::test]`
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, TEST_SECRET.to_string()))
}

/// Crea un TestServer per i test
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = school_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Genera un JWT token valido 24 ore per l'utente indicato
///
/// # Arguments
/// * `user` - Riferimento `(id, tipo)` dell'utente
/// * `email` - Email riportata nei claims
/// * `jwt_secret` - Secret key per firmare il token
pub fn create_test_jwt(user: UserRef, email: &str, jwt_secret: &str) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = Utc::now();
    let claims = Claims {
        exp: (now + Duration::hours(24)).timestamp() as usize,
        iat: now.timestamp() as usize,
        id: user.id(),
        user_type: user.kind(),
        email: email.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("Failed to create JWT token")
}

pub fn authorization() -> HeaderName {
    HeaderName::from_static("authorization")
}

/// Valore dell'header Authorization per un utente dei fixtures
pub fn bearer(user: UserRef) -> String {
    format!("Bearer {}", create_test_jwt(user, "fixture@school.test", TEST_SECRET))
}

pub const ADMIN: UserRef = UserRef::Administrator(1);
pub const TEACHER: UserRef = UserRef::Teacher(1);
pub const OTHER_TEACHER: UserRef = UserRef::Teacher(2);
pub const PARENT: UserRef = UserRef::Parent(1);
pub const OTHER_PARENT: UserRef = UserRef::Parent(2);
pub const STUDENT: UserRef = UserRef::Student(1);
