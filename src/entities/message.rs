//! Message entity - Entità messaggio

use super::user_ref::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: i32,
    pub conversation_id: i32,
    // colonne sender_id + sender_type
    pub sender: UserRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Message {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            message_id: row.try_get("message_id")?,
            conversation_id: row.try_get("conversation_id")?,
            sender: UserRef::from_row(row, "sender")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
