//! Attendance services - Consultazione del registro presenze

use crate::core::{AppError, AppState, Json, Query};
use crate::dtos::{AttendanceQuery, Page, Pagination};
use crate::entities::{Account, Attendance};
use crate::services::student::visible_students;
use axum::{
    Extension,
    extract::State,
};
use std::sync::Arc;
use tracing::instrument;

/// Stesse regole di visibilità dei voti
#[instrument(skip(state, current_user), fields(user = %current_user.user))]
pub async fn list_attendance(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AttendanceQuery>, // /attendance?student_id=1&status=absent
    Extension(current_user): Extension<Account>,
) -> Result<Json<Page<Attendance>>, AppError> {
    let pagination = Pagination::new(params.page, params.limit);
    let students = visible_students(&state, &current_user).await?;
    let (rows, total) = state
        .attendance
        .paginate_visible(&params, students.as_deref(), pagination)
        .await?;
    Ok(Json(Page::new(rows, total, pagination)))
}
