//! Conversation entities - Conversazione e partecipanti polimorfici

use super::user_ref::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Conversation {
    pub conversation_id: i32,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConversationParticipant {
    pub conversation_id: i32,
    pub participant: UserRef,
    pub joined_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for ConversationParticipant {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            conversation_id: row.try_get("conversation_id")?,
            participant: UserRef::from_row(row, "user")?,
            joined_at: row.try_get("joined_at")?,
        })
    }
}
