//! MessageRepository - Repository per la gestione dei messaggi

use super::{Create, Delete, PoolType, Read};
use crate::dtos::{CreateMessageDTO, Pagination};
use crate::entities::Message;
use sqlx::Error;

const MESSAGE_COLUMNS: &str = "message_id, conversation_id, sender_id, sender_type, content, created_at";

// MESSAGE REPO
pub struct MessageRepository {
    connection_pool: PoolType,
}

impl MessageRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Page of messages of a conversation, newest first
    ///
    /// # Returns
    /// The messages of the page and the total number of messages in the conversation
    pub async fn page_by_conversation(
        &self,
        conversation_id: &i32,
        pagination: Pagination,
    ) -> Result<(Vec<Message>, i64), Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_one(&self.connection_pool)
            .await?;

        let messages = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE conversation_id = ? \
             ORDER BY created_at DESC, message_id DESC \
             LIMIT ? OFFSET ?"
        ))
        .bind(conversation_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.connection_pool)
        .await?;

        Ok((messages, total))
    }
}

impl Create<Message, CreateMessageDTO> for MessageRepository {
    async fn create(&self, data: &CreateMessageDTO) -> Result<Message, Error> {
        // id e tipo del mittente vengono sempre dallo stesso UserRef
        sqlx::query_as::<_, Message>(&format!(
            "INSERT INTO messages (conversation_id, sender_id, sender_type, content, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(data.conversation_id)
        .bind(data.sender.id())
        .bind(data.sender.kind())
        .bind(&data.content)
        .bind(data.created_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Message, i32> for MessageRepository {
    async fn read(&self, id: &i32) -> Result<Option<Message>, Error> {
        sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE message_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<i32> for MessageRepository {
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM messages WHERE message_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRef;
    use chrono::Utc;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("accounts", "messaging")))]
    async fn create_stores_sender_id_and_type_together(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool.clone());
        let message = repo
            .create(&CreateMessageDTO {
                conversation_id: 1,
                sender: UserRef::Parent(1),
                content: "Bonjour".to_string(),
                created_at: Utc::now(),
            })
            .await?;

        let (id, kind): (i32, String) =
            sqlx::query_as("SELECT sender_id, sender_type FROM messages WHERE message_id = ?")
                .bind(message.message_id)
                .fetch_one(&pool)
                .await?;
        assert_eq!((id, kind.as_str()), (1, "parent"));
        assert_eq!(message.sender, UserRef::Parent(1));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("accounts", "messaging")))]
    async fn page_is_newest_first(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);
        let (messages, total) = repo
            .page_by_conversation(&1, Pagination::new(Some(1), Some(2)))
            .await?;
        assert_eq!(total, 3);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].created_at >= messages[1].created_at);
        Ok(())
    }
}
