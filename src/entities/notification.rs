//! Notification entity - Notifica destinata a un utente di qualsiasi tipo

use super::enums::NotificationKind;
use super::user_ref::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Notification {
    pub notification_id: i32,
    // colonne recipient_id + recipient_type
    pub recipient: UserRef,
    pub kind: NotificationKind,
    pub title: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Notification {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            notification_id: row.try_get("notification_id")?,
            recipient: UserRef::from_row(row, "recipient")?,
            kind: row.try_get("kind")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            is_read: row.try_get("is_read")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
