//! Message DTOs - Data Transfer Objects per messaggi

use crate::dtos::UserSummaryDTO;
use crate::entities::{Message, UserRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Messaggio con mittente risolto
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub message_id: i32,
    pub conversation_id: i32,
    /// `null` se il mittente non esiste più
    pub sender: Option<UserSummaryDTO>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MessageDTO {
    pub fn new(message: Message, sender: Option<UserSummaryDTO>) -> Self {
        Self {
            message_id: message.message_id,
            conversation_id: message.conversation_id,
            sender,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

/// Corpo della richiesta POST /api/messages
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SendMessageDTO {
    pub conversation_id: i32,
    #[validate(length(min = 1, max = 5000, message = "Message content must be between 1 and 5000 characters"))]
    pub content: String,
}

/// DTO per creare un nuovo messaggio (senza message_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateMessageDTO {
    pub conversation_id: i32,
    pub sender: UserRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
