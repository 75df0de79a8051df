//! Session DTOs - Séance e registrazione presenze

use crate::entities::{Attendance, AttendanceStatus, SessionKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn validate_window(session: &CreateSessionDTO) -> Result<(), ValidationError> {
    if session.starts_at >= session.ends_at {
        return Err(ValidationError::new("starts_at_after_ends_at"));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_window", message = "starts_at must precede ends_at"))]
pub struct CreateSessionDTO {
    pub classe_id: i32,
    pub teacher_id: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    pub kind: SessionKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[validate(length(max = 50))]
    pub room: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateSessionDTO {
    pub teacher_id: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    pub kind: Option<SessionKind>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[validate(length(max = 50))]
    pub room: Option<String>,
}

/// Una riga della registrazione presenze in blocco
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct AttendanceEntryDTO {
    pub student_id: i32,
    pub status: AttendanceStatus,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

/// Upsert di una presenza, usato dal repository
#[derive(Debug, Clone)]
pub struct RecordAttendanceDTO {
    pub session_id: i32,
    pub student_id: i32,
    pub status: AttendanceStatus,
    pub comment: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AttendanceErrorDTO {
    pub student_id: i32,
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct BulkAttendanceResultDTO {
    pub recorded: Vec<Attendance>,
    pub errors: Vec<AttendanceErrorDTO>,
}
