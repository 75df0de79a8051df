//! Alert DTOs - Avvisi e definizione del pubblico destinatario

use crate::entities::{Alert, AlertLevel, UserKind, UserRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A chi viene recapitato un avviso
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum AlertAudience {
    Everyone,
    Role {
        role: UserKind,
    },
    Classe {
        classe_id: i32,
        #[serde(default)]
        include_parents: bool,
    },
    Users {
        users: Vec<UserRef>,
    },
}

impl AlertAudience {
    /// Descrizione salvata nello storico
    pub fn describe(&self) -> String {
        match self {
            AlertAudience::Everyone => "everyone".to_string(),
            AlertAudience::Role { role } => format!("role:{}", role),
            AlertAudience::Classe {
                classe_id,
                include_parents,
            } => {
                if *include_parents {
                    format!("classe:{}+parents", classe_id)
                } else {
                    format!("classe:{}", classe_id)
                }
            }
            AlertAudience::Users { users } => format!("users:{}", users.len()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateAlertDTO {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    pub level: AlertLevel,
    pub audience: AlertAudience,
}

/// Riga dello storico pronta per l'inserimento
#[derive(Debug, Clone)]
pub struct NewAlertDTO {
    pub sender: UserRef,
    pub title: String,
    pub content: String,
    pub level: AlertLevel,
    pub audience: String,
    pub recipients: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AlertDispatchDTO {
    pub alert: Alert,
    pub delivered: usize,
    pub skipped: usize,
}
