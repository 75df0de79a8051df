//! Statistics services - Aggregati per la dashboard

use crate::core::{AppError, AppState, Json, Path, require_kind};
use crate::dtos::{ClasseStatsDTO, OverviewStatsDTO};
use crate::entities::{Account, UserKind, weighted_average};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::State,
};
use std::sync::Arc;
use tracing::instrument;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<OverviewStatsDTO>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator])?;

    let (grades, average_grade) = state.statistics.grades_overview().await?;
    Ok(Json(OverviewStatsDTO {
        users: state.statistics.user_counts().await?,
        classes: state.statistics.classes().await?,
        sessions: state.statistics.sessions().await?,
        grades,
        average_grade: average_grade.map(round2),
        attendance: state.statistics.attendance_by_status(None).await?,
    }))
}

#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn get_classe_stats(
    State(state): State<Arc<AppState>>,
    Path(classe_id): Path<i32>,
    Extension(current_user): Extension<Account>,
) -> Result<Json<ClasseStatsDTO>, AppError> {
    require_kind(&current_user, &[UserKind::Administrator, UserKind::Teacher])?;

    let classe = state
        .classe
        .read(&classe_id)
        .await?
        .ok_or_else(|| AppError::not_found("Class not found"))?;

    let grades = state.grade.find_many_by_classe(&classe_id).await?;
    let attendance = state.statistics.attendance_by_status(Some(classe_id)).await?;
    let recorded: i64 = attendance.values().sum();
    let absences = attendance.get("absent").copied().unwrap_or(0);

    Ok(Json(ClasseStatsDTO {
        classe_id,
        name: classe.name,
        students: state.student.count_by_classe(&classe_id).await?,
        average_grade: weighted_average(&grades),
        subjects: state.statistics.subject_averages(&classe_id).await?,
        absence_rate: (recorded > 0).then(|| round2(absences as f64 / recorded as f64)),
    }))
}
