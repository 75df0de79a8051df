//! Alert entity - Storico degli avvisi inviati a un pubblico

use super::enums::AlertLevel;
use super::user_ref::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Alert {
    pub alert_id: i32,
    pub sender: UserRef,
    pub title: String,
    pub content: String,
    pub level: AlertLevel,
    /// Descrizione leggibile del pubblico, es. `role:teacher`
    pub audience: String,
    pub recipients: i32,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Alert {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            alert_id: row.try_get("alert_id")?,
            sender: UserRef::from_row(row, "sender")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            level: row.try_get("level")?,
            audience: row.try_get("audience")?,
            recipients: row.try_get("recipients")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
