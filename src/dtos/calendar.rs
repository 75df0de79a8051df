//! Calendar DTOs - Data Transfer Objects per gli eventi del calendario

use crate::entities::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn validate_window(event: &CreateEventDTO) -> Result<(), ValidationError> {
    if event.starts_at > event.ends_at {
        return Err(ValidationError::new("starts_at_after_ends_at"));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_window", message = "starts_at must not follow ends_at"))]
pub struct CreateEventDTO {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub classe_id: Option<i32>,
}

/// Evento con autore, pronto per l'inserimento
#[derive(Debug, Clone)]
pub struct NewEventDTO {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub classe_id: Option<i32>,
    pub created_by: UserRef,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateEventDTO {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}
