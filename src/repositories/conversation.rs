//! ConversationRepository - Conversazioni e partecipanti polimorfici

use super::{Delete, PoolType, Read};
use crate::entities::{Conversation, ConversationParticipant, UserRef};
use chrono::{DateTime, Utc};
use sqlx::Error;
use tracing::{debug, instrument};

const PARTICIPANT_COLUMNS: &str = "conversation_id, user_id, user_type, joined_at";

pub struct ConversationRepository {
    connection_pool: PoolType,
}

impl ConversationRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Create a conversation and its participants in one transaction
    #[instrument(skip(self, participants), fields(participants = participants.len()))]
    pub async fn create_with_participants(
        &self,
        title: Option<&str>,
        participants: &[UserRef],
        created_at: DateTime<Utc>,
    ) -> Result<Conversation, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let conversation = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (title, created_at) VALUES (?, ?) \
             RETURNING conversation_id, title, created_at",
        )
        .bind(title)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;

        for participant in participants {
            sqlx::query(
                "INSERT INTO conversation_participants (conversation_id, user_id, user_type, joined_at) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(conversation.conversation_id)
            .bind(participant.id())
            .bind(participant.kind())
            .bind(created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Conversation {} created", conversation.conversation_id);
        Ok(conversation)
    }

    /// Conversations the user takes part in, most recent first
    pub async fn find_many_by_participant(&self, user: &UserRef) -> Result<Vec<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            "SELECT c.conversation_id, c.title, c.created_at \
             FROM conversations c \
             JOIN conversation_participants p ON p.conversation_id = c.conversation_id \
             WHERE p.user_id = ? AND p.user_type = ? \
             ORDER BY c.created_at DESC, c.conversation_id DESC",
        )
        .bind(user.id())
        .bind(user.kind())
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn participants(&self, conversation_id: &i32) -> Result<Vec<ConversationParticipant>, Error> {
        sqlx::query_as::<_, ConversationParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM conversation_participants \
             WHERE conversation_id = ? ORDER BY joined_at, user_type, user_id"
        ))
        .bind(conversation_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn is_participant(&self, conversation_id: &i32, user: &UserRef) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM conversation_participants \
             WHERE conversation_id = ? AND user_id = ? AND user_type = ?",
        )
        .bind(conversation_id)
        .bind(user.id())
        .bind(user.kind())
        .fetch_one(&self.connection_pool)
        .await?;
        Ok(count > 0)
    }

    /// A participant already present trips the primary key (409)
    pub async fn add_participant(
        &self,
        conversation_id: &i32,
        user: &UserRef,
        joined_at: DateTime<Utc>,
    ) -> Result<ConversationParticipant, Error> {
        sqlx::query_as::<_, ConversationParticipant>(&format!(
            "INSERT INTO conversation_participants (conversation_id, user_id, user_type, joined_at) \
             VALUES (?, ?, ?, ?) RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(conversation_id)
        .bind(user.id())
        .bind(user.kind())
        .bind(joined_at)
        .fetch_one(&self.connection_pool)
        .await
    }

    pub async fn remove_participant(&self, conversation_id: &i32, user: &UserRef) -> Result<(), Error> {
        let result = sqlx::query(
            "DELETE FROM conversation_participants \
             WHERE conversation_id = ? AND user_id = ? AND user_type = ?",
        )
        .bind(conversation_id)
        .bind(user.id())
        .bind(user.kind())
        .execute(&self.connection_pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }

    pub async fn count_participants(&self, conversation_id: &i32) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM conversation_participants WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Read<Conversation, i32> for ConversationRepository {
    async fn read(&self, id: &i32) -> Result<Option<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            "SELECT conversation_id, title, created_at FROM conversations WHERE conversation_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<i32> for ConversationRepository {
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM conversations WHERE conversation_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}
