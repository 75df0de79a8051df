//! Session entity - Séance: lezione, verifica o riunione pianificata

use super::enums::SessionKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Session {
    pub session_id: i32,
    pub classe_id: i32,
    pub teacher_id: Option<i32>,
    pub subject: String,
    pub kind: SessionKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub room: Option<String>,
}
