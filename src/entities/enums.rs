//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ********************* ENUMERAZIONI UTILI **********************//

/// Discriminatore del tipo di utente: seleziona in quale delle quattro
/// tabelle utente vive un id.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserKind {
    Administrator,
    Teacher,
    Student,
    Parent,
}

impl UserKind {
    pub const ALL: [UserKind; 4] = [
        UserKind::Administrator,
        UserKind::Teacher,
        UserKind::Student,
        UserKind::Parent,
    ];

    /// Valore salvato nelle colonne discriminatore
    pub fn as_str(&self) -> &'static str {
        match self {
            UserKind::Administrator => "administrator",
            UserKind::Teacher => "teacher",
            UserKind::Student => "student",
            UserKind::Parent => "parent",
        }
    }

    /// Tabella che contiene gli utenti di questo tipo
    pub fn table(&self) -> &'static str {
        match self {
            UserKind::Administrator => "administrators",
            UserKind::Teacher => "teachers",
            UserKind::Student => "students",
            UserKind::Parent => "parents",
        }
    }

    /// Ruolo esposto nel profilo, nello stile `ROLE_*`
    pub fn role(&self) -> &'static str {
        match self {
            UserKind::Administrator => "ROLE_ADMIN",
            UserKind::Teacher => "ROLE_TEACHER",
            UserKind::Student => "ROLE_STUDENT",
            UserKind::Parent => "ROLE_PARENT",
        }
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUserKind(pub String);

impl fmt::Display for UnknownUserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown user type '{}'", self.0)
    }
}

impl std::error::Error for UnknownUserKind {}

impl FromStr for UserKind {
    type Err = UnknownUserKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(UserKind::Administrator),
            "teacher" => Ok(UserKind::Teacher),
            "student" => Ok(UserKind::Student),
            "parent" => Ok(UserKind::Parent),
            other => Err(UnknownUserKind(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SessionKind {
    Lecture,
    Exam,
    Meeting,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// Stati che generano una notifica al genitore
    pub fn notifies_parent(&self) -> bool {
        matches!(self, AttendanceStatus::Absent | AttendanceStatus::Late)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Alert,
    Message,
    Grade,
    Attendance,
    Event,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Urgent,
}
