//! CalendarEvent entity - Evento del calendario scolastico

use super::user_ref::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CalendarEvent {
    pub event_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub classe_id: Option<i32>,
    pub created_by: UserRef,
}

impl<'r> FromRow<'r, SqliteRow> for CalendarEvent {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            event_id: row.try_get("event_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            starts_at: row.try_get("starts_at")?,
            ends_at: row.try_get("ends_at")?,
            classe_id: row.try_get("classe_id")?,
            created_by: UserRef::from_row(row, "created_by")?,
        })
    }
}
