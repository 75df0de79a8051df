//! UserRef - Riferimento polimorfico a un utente di qualsiasi tipo
//!
//! Messaggi, notifiche, partecipanti, avvisi ed eventi salvano l'utente come
//! coppia di colonne `(<prefix>_id, <prefix>_type)`. Nel codice la coppia è
//! sempre un `UserRef`, quindi id e tipo vengono scritti e letti insieme.

use super::enums::UserKind;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::fmt;

/// JSON: `{"type": "teacher", "id": 3}`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum UserRef {
    Administrator(i32),
    Teacher(i32),
    Student(i32),
    Parent(i32),
}

impl UserRef {
    pub fn new(kind: UserKind, id: i32) -> Self {
        match kind {
            UserKind::Administrator => UserRef::Administrator(id),
            UserKind::Teacher => UserRef::Teacher(id),
            UserKind::Student => UserRef::Student(id),
            UserKind::Parent => UserRef::Parent(id),
        }
    }

    pub fn kind(&self) -> UserKind {
        match self {
            UserRef::Administrator(_) => UserKind::Administrator,
            UserRef::Teacher(_) => UserKind::Teacher,
            UserRef::Student(_) => UserKind::Student,
            UserRef::Parent(_) => UserKind::Parent,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            UserRef::Administrator(id)
            | UserRef::Teacher(id)
            | UserRef::Student(id)
            | UserRef::Parent(id) => id,
        }
    }

    /// Legge la coppia `(<prefix>_id, <prefix>_type)` da una riga
    pub fn from_row(row: &SqliteRow, prefix: &str) -> Result<Self, sqlx::Error> {
        let id: i32 = row.try_get(format!("{prefix}_id").as_str())?;
        let kind: UserKind = row.try_get(format!("{prefix}_type").as_str())?;
        Ok(Self::new(kind, id))
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind(), self.id())
    }
}
