//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};
use chrono::Utc;
use dtos::NewAccountDTO;
use entities::hash_password;
use repositories::Create;
use std::sync::Arc;
use tracing::{debug, info};

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api", configure_api_routes(state.clone()))
        .with_state(state)
}

fn configure_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/auth", configure_auth_routes(state.clone()))
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/students", configure_student_routes(state.clone()))
        .nest("/classes", configure_classe_routes(state.clone()))
        .nest("/timetables", configure_timetable_routes(state.clone()))
        .nest("/sessions", configure_session_routes(state.clone()))
        .nest("/grades", configure_grade_routes(state.clone()))
        .nest("/attendance", configure_attendance_routes(state.clone()))
        .nest("/calendar", configure_calendar_routes(state.clone()))
        .nest("/alerts", configure_alert_routes(state.clone()))
        .nest("/notifications", configure_notification_routes(state.clone()))
        .nest("/conversations", configure_conversation_routes(state.clone()))
        .nest("/messages", configure_message_routes(state.clone()))
        .nest("/statistics", configure_statistics_routes(state))
}

/// Configura le routes di autenticazione: solo il login è pubblico
fn configure_auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    let protected = Router::new()
        .route("/me", get(get_me))
        .route("/password", patch(change_password))
        .layer(middleware::from_fn_with_state(state, authentication_middleware));

    Router::new()
        .route("/login", post(login_user))
        .merge(protected)
}

/// Configura le routes per la gestione degli utenti di qualsiasi tipo
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{type}/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_student_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_students))
        .route("/{id}", get(get_student))
        .route("/{id}/classe", put(assign_classe))
        .route("/{id}/parent", put(assign_parent))
        .route("/{id}/grades", get(get_student_grades))
        .route("/{id}/attendance", get(get_student_attendance))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_classe_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_classes).post(create_classe))
        .route(
            "/{id}",
            get(get_classe).patch(update_classe).delete(delete_classe),
        )
        .route("/{id}/students", get(list_classe_students))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_timetable_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_timetables).post(create_timetable))
        .route("/{id}", patch(update_timetable).delete(delete_timetable))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_session_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route(
            "/{id}",
            get(get_session).patch(update_session).delete(delete_session),
        )
        .route(
            "/{id}/attendance",
            get(get_session_attendance).post(record_attendance),
        )
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_grade_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_grades).post(create_grade))
        .route("/{id}", patch(update_grade).delete(delete_grade))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_attendance_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_attendance))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_calendar_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", patch(update_event).delete(delete_event))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_alert_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_alerts).post(create_alert))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_notification_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{id}/read", patch(mark_notification_read))
        .route("/{id}", delete(delete_notification))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_conversation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_conversations).post(create_conversation))
        .route("/{id}", get(get_conversation))
        .route("/{id}/participants", post(add_participant))
        .route("/{id}/participants/me", delete(leave_conversation))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_message_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_messages).post(send_message))
        .route("/{id}", delete(delete_message))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

fn configure_statistics_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(get_overview))
        .route("/classes/{id}", get(get_classe_stats))
        .layer(middleware::from_fn_with_state(state, authentication_middleware))
}

/// Crea il primo amministratore se la tabella è vuota e le credenziali sono configurate
///
/// # Returns
/// * `Ok(true)` se l'amministratore è stato creato
/// * `Ok(false)` se esisteva già almeno un amministratore
pub async fn bootstrap_admin(state: &AppState, email: &str, password: &str) -> Result<bool, AppError> {
    if state.administrator.count().await? > 0 {
        debug!("Administrators already present, skipping bootstrap");
        return Ok(false);
    }

    let admin = state
        .administrator
        .create(&NewAccountDTO {
            email: email.to_string(),
            password: hash_password(password)?,
            firstname: "Admin".to_string(),
            lastname: "School".to_string(),
            created_at: Utc::now(),
        })
        .await?;

    info!("Bootstrap administrator {} created", admin.id);
    Ok(true)
}
