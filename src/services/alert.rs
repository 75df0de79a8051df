//! Alert services - Avvisi inviati a un pubblico e notificati a ciascun destinatario

use crate::core::{AppError, AppState, Json, Query, require_kind};
use crate::dtos::{AlertAudience, AlertDispatchDTO, CreateAlertDTO, NewAlertDTO, Page, PaginationQuery};
use crate::entities::{Account, Alert, UserKind, UserRef};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Destinatari risolti e numero di riferimenti scartati perché inesistenti
async fn resolve_audience(
    state: &AppState,
    audience: &AlertAudience,
) -> Result<(Vec<UserRef>, usize), AppError> {
    let (candidates, skipped) = match audience {
        AlertAudience::Everyone => {
            let mut users = Vec::new();
            for kind in UserKind::ALL {
                users.extend(state.directory.list_refs(kind).await?);
            }
            (users, 0)
        }
        AlertAudience::Role { role } => (state.directory.list_refs(*role).await?, 0),
        AlertAudience::Classe {
            classe_id,
            include_parents,
        } => {
            if state.classe.read(classe_id).await?.is_none() {
                return Err(AppError::not_found("Class not found"));
            }
            let students = state.student.find_many_by_classe(classe_id).await?;
            let mut users: Vec<UserRef> = students.iter().map(|s| s.user_ref()).collect();
            if *include_parents {
                users.extend(students.iter().filter_map(|s| s.parent_id.map(UserRef::Parent)));
            }
            (users, 0)
        }
        AlertAudience::Users { users } => {
            let resolved = state.directory.resolve_many(users).await?;
            // un riferimento ripetuto conta una volta sola, anche tra gli scartati
            let mut seen = HashSet::new();
            let (found, missing): (Vec<UserRef>, Vec<UserRef>) = users
                .iter()
                .copied()
                .filter(|user| seen.insert(*user))
                .partition(|user| resolved.contains_key(user));
            (found, missing.len())
        }
    };

    // stesso destinatario una sola volta, nell'ordine di arrivo
    let mut seen = HashSet::new();
    let recipients = candidates
        .into_iter()
        .filter(|user| seen.insert(*user))
        .collect();
    Ok((recipients, skipped))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationQuery>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<Page<Alert>>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator, UserKind::Teacher])?;
    let pagination = params.pagination();
    let (alerts, total) = state.alert.page(pagination).await?;
    Ok(Json(Page::new(alerts, total, pagination)))
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user = %current_user.user, audience = %body.audience.describe()))]
pub async fn create_alert(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
    Json(body): Json<CreateAlertDTO>,
) -> Result<impl IntoResponse, AppError> {
    require_kind(&current_user, &[UserKind::Administrator, UserKind::Teacher])?;
    body.validate()?;

    // 1. Risolvere il pubblico in una lista di UserRef esistenti
    let (recipients, skipped) = resolve_audience(&state, &body.audience).await?;
    debug!("Audience resolved to {} recipients, {} skipped", recipients.len(), skipped);

    // 2. Storico e notifiche nella stessa transazione
    let (alert, delivered) = state
        .alert
        .create_and_notify(
            &NewAlertDTO {
                sender: current_user.user,
                title: body.title,
                content: body.content,
                level: body.level,
                audience: body.audience.describe(),
                recipients: recipients.len() as i32,
                created_at: Utc::now(),
            },
            &recipients,
        )
        .await?;
    let delivered = delivered as usize;

    info!("Alert {} delivered to {} users", alert.alert_id, delivered);
    Ok((
        StatusCode::CREATED,
        Json(AlertDispatchDTO {
            alert,
            delivered,
            skipped,
        }),
    ))
}
