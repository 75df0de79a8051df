//! Notification services - Notifiche dell'utente corrente

use crate::core::{AppError, AppState, Json, Path, Query};
use crate::dtos::{CreateNotificationDTO, NotificationQuery, Page, Pagination, ReadAllDTO, UnreadCountDTO};
use crate::entities::{Account, Notification, NotificationKind, UserRef};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Persiste una notifica per ciascun destinatario
///
/// # Returns
/// Numero di notifiche create
pub(crate) async fn notify(
    state: &AppState,
    recipients: &[UserRef],
    kind: NotificationKind,
    title: &str,
    content: &str,
) -> Result<u64, AppError> {
    if recipients.is_empty() {
        return Ok(0);
    }
    let notifications: Vec<CreateNotificationDTO> = recipients
        .iter()
        .map(|recipient| CreateNotificationDTO::new(*recipient, kind, title, content))
        .collect();
    let created = state.notification.create_many(&notifications).await?;
    debug!("Sent {} {:?} notifications", created, kind);
    Ok(created)
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NotificationQuery>, // /notifications?unread=true
    Extension(current_user): Extension<Account>,
) -> Result<Json<Page<Notification>>, AppError> {
    let pagination = Pagination::new(params.page, params.limit);
    let (notifications, total) = state
        .notification
        .page_for(&current_user.user, params.unread.unwrap_or(false), pagination)
        .await?;
    Ok(Json(Page::new(notifications, total, pagination)))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<UnreadCountDTO>, AppError> {
    let unread = state.notification.count_unread(&current_user.user).await?;
    Ok(Json(UnreadCountDTO { unread }))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<Notification>, AppError> {
    // le notifiche di altri utenti risultano inesistenti (404)
    let notification = state
        .notification
        .mark_read(&notification_id, &current_user.user)
        .await?;
    Ok(Json(notification))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<ReadAllDTO>, AppError> {
    let updated = state.notification.mark_all_read(&current_user.user).await?;
    info!("Marked {} notifications as read", updated);
    Ok(Json(ReadAllDTO { updated }))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<impl IntoResponse, AppError> {
    state
        .notification
        .delete_owned(&notification_id, &current_user.user)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
