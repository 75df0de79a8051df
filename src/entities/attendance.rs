//! Attendance entity - Presenza di uno studente a una séance

use super::enums::AttendanceStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Attendance {
    pub attendance_id: i32,
    pub session_id: i32,
    pub student_id: i32,
    pub status: AttendanceStatus,
    pub comment: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
