//! Conversation DTOs - Conversazioni e partecipanti risolti

use crate::dtos::UserSummaryDTO;
use crate::entities::{Conversation, UserRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateConversationDTO {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "A conversation needs between 1 and 100 participants"))]
    pub participants: Vec<UserRef>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddParticipantDTO {
    pub participant: UserRef,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ParticipantDTO {
    pub participant: UserRef,
    /// `null` se l'utente è stato cancellato
    pub user: Option<UserSummaryDTO>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConversationDTO {
    pub conversation_id: i32,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<ParticipantDTO>,
}

impl ConversationDTO {
    pub fn new(conversation: Conversation, participants: Vec<ParticipantDTO>) -> Self {
        Self {
            conversation_id: conversation.conversation_id,
            title: conversation.title,
            created_at: conversation.created_at,
            participants,
        }
    }
}
