//! User DTOs - Data Transfer Objects per i quattro tipi di utente

use crate::entities::{
    Account, Administrator, ParentUser, Student, Teacher, UserKind,
};
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Nomi propri: lettere (anche accentate), spazi, apostrofi e trattini
    pub static ref NAME_REGEX: Regex = Regex::new(r"^[\p{L}][\p{L} '\-]*$").unwrap();
}

/// Profilo completo restituito al client (mai la password)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: UserKind,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classe_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl UserDTO {
    fn base(
        kind: UserKind,
        id: i32,
        email: String,
        firstname: String,
        lastname: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            email,
            firstname,
            lastname,
            roles: vec![kind.role().to_string()],
            subject: None,
            phone: None,
            birth_date: None,
            classe_id: None,
            parent_id: None,
            created_at,
        }
    }
}

impl From<Administrator> for UserDTO {
    fn from(value: Administrator) -> Self {
        Self::base(
            UserKind::Administrator,
            value.id,
            value.email,
            value.firstname,
            value.lastname,
            value.created_at,
        )
    }
}

impl From<Teacher> for UserDTO {
    fn from(value: Teacher) -> Self {
        Self {
            subject: value.subject,
            ..Self::base(
                UserKind::Teacher,
                value.id,
                value.email,
                value.firstname,
                value.lastname,
                value.created_at,
            )
        }
    }
}

impl From<Student> for UserDTO {
    fn from(value: Student) -> Self {
        Self {
            birth_date: value.birth_date,
            classe_id: value.classe_id,
            parent_id: value.parent_id,
            ..Self::base(
                UserKind::Student,
                value.id,
                value.email,
                value.firstname,
                value.lastname,
                value.created_at,
            )
        }
    }
}

impl From<ParentUser> for UserDTO {
    fn from(value: ParentUser) -> Self {
        Self {
            phone: value.phone,
            ..Self::base(
                UserKind::Parent,
                value.id,
                value.email,
                value.firstname,
                value.lastname,
                value.created_at,
            )
        }
    }
}

/// Versione compatta usata nelle liste e nei riferimenti risolti
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummaryDTO {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: UserKind,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<Account> for UserSummaryDTO {
    fn from(value: Account) -> Self {
        Self {
            id: value.id(),
            kind: value.kind(),
            email: value.email,
            firstname: value.firstname,
            lastname: value.lastname,
        }
    }
}

/// Richiesta di creazione di un utente di qualsiasi tipo
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[serde(rename = "type")]
    pub kind: UserKind,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100), regex(path = *NAME_REGEX, message = "Invalid firstname"))]
    pub firstname: String,

    #[validate(length(min = 1, max = 100), regex(path = *NAME_REGEX, message = "Invalid lastname"))]
    pub lastname: String,

    /// Solo insegnanti
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,

    /// Solo genitori
    #[validate(length(min = 4, max = 32))]
    pub phone: Option<String>,

    /// Solo studenti
    pub birth_date: Option<NaiveDate>,
    pub classe_id: Option<i32>,
    pub parent_id: Option<i32>,
}

/// Aggiornamento parziale: solo i campi `Some(_)` vengono modificati
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateUserDTO {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: Option<String>,

    #[validate(length(min = 1, max = 100), regex(path = *NAME_REGEX, message = "Invalid firstname"))]
    pub firstname: Option<String>,

    #[validate(length(min = 1, max = 100), regex(path = *NAME_REGEX, message = "Invalid lastname"))]
    pub lastname: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,

    #[validate(length(min = 4, max = 32))]
    pub phone: Option<String>,

    pub birth_date: Option<NaiveDate>,
}

impl UpdateUserDTO {
    /// Campi che un utente può modificare sul proprio profilo
    pub fn only_names(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.subject.is_none()
            && self.phone.is_none()
            && self.birth_date.is_none()
    }
}

/// Campi comuni già validati e con password hashata, passati ai repository
#[derive(Debug, Clone)]
pub struct NewAccountDTO {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTeacherDTO {
    pub account: NewAccountDTO,
    pub subject: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStudentDTO {
    pub account: NewAccountDTO,
    pub birth_date: Option<NaiveDate>,
    pub classe_id: Option<i32>,
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewParentDTO {
    pub account: NewAccountDTO,
    pub phone: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponseDTO {
    pub token: String,
    pub user: UserDTO,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct ChangePasswordDTO {
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub new_password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AssignClasseDTO {
    pub classe_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AssignParentDTO {
    pub parent_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_request(firstname: &str) -> CreateUserDTO {
        serde_json::from_value(json!({
            "type": "teacher",
            "email": "jean.dupont@school.test",
            "password": "Password123",
            "firstname": firstname,
            "lastname": "Dupont",
            "subject": "Histoire"
        }))
        .unwrap()
    }

    #[test]
    fn accepts_accented_and_compound_names() {
        assert!(create_request("Jean-Pierre").validate().is_ok());
        assert!(create_request("Hélène").validate().is_ok());
        assert!(create_request("D'Arcy").validate().is_ok());
    }

    #[test]
    fn rejects_names_with_digits_or_symbols() {
        assert!(create_request("R2D2").validate().is_err());
        assert!(create_request("<script>").validate().is_err());
        assert!(create_request("").validate().is_err());
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        let mut request = create_request("Jean");
        request.email = "not-an-email".to_string();
        assert!(request.validate().is_err());

        let mut request = create_request("Jean");
        request.password = "short".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn profile_never_exposes_password() {
        let teacher = Teacher {
            id: 2,
            email: "t@school.test".to_string(),
            password: "$2b$04$secret".to_string(),
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            subject: Some("Maths".to_string()),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(UserDTO::from(teacher)).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["type"], "teacher");
        assert_eq!(value["roles"], json!(["ROLE_TEACHER"]));
        assert_eq!(value["subject"], "Maths");
        assert!(value.get("classe_id").is_none());
    }

    #[test]
    fn only_names_detects_privileged_fields() {
        let update = UpdateUserDTO {
            firstname: Some("Ada".to_string()),
            ..Default::default()
        };
        assert!(update.only_names());
        let update = UpdateUserDTO {
            email: Some("x@school.test".to_string()),
            ..Default::default()
        };
        assert!(!update.only_names());
    }
}
