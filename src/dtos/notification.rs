//! Notification DTOs - Data Transfer Objects per notifiche

use crate::entities::{NotificationKind, UserRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DTO per creare una notifica: destinatario come coppia (id, tipo) indivisibile
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateNotificationDTO {
    pub recipient: UserRef,
    pub kind: NotificationKind,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CreateNotificationDTO {
    pub fn new(
        recipient: UserRef,
        kind: NotificationKind,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            kind,
            title: title.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UnreadCountDTO {
    pub unread: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReadAllDTO {
    pub updated: u64,
}
