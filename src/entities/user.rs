//! User entities - Le quattro tabelle utente indipendenti e metodi per le password

use super::enums::UserKind;
use super::user_ref::UserRef;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Administrator {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Teacher {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Student {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub birth_date: Option<NaiveDate>,
    pub classe_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct ParentUser {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Vista comune a tutte le tabelle utente: è ciò che il middleware di
/// autenticazione mette nelle Extension della richiesta.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Account {
    pub user: UserRef,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub firstname: String,
    pub lastname: String,
}

impl Account {
    pub fn kind(&self) -> UserKind {
        self.user.kind()
    }

    pub fn id(&self) -> i32 {
        self.user.id()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.password).unwrap_or(false)
    }
}

/// Hash a password using bcrypt with default cost
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    let hash = hash(password, DEFAULT_COST)?;
    Ok(hash)
}

macro_rules! impl_account {
    ($entity:ty, $variant:ident) => {
        impl From<$entity> for Account {
            fn from(value: $entity) -> Self {
                Self {
                    user: UserRef::$variant(value.id),
                    email: value.email,
                    password: value.password,
                    firstname: value.firstname,
                    lastname: value.lastname,
                }
            }
        }

        impl $entity {
            pub fn user_ref(&self) -> UserRef {
                UserRef::$variant(self.id)
            }
        }
    };
}

impl_account!(Administrator, Administrator);
impl_account!(Teacher, Teacher);
impl_account!(Student, Student);
impl_account!(ParentUser, Parent);

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with_password(password: &str) -> Account {
        Account {
            user: UserRef::Teacher(1),
            email: "marie.curie@school.test".to_string(),
            password: bcrypt::hash(password, 4).unwrap(),
            firstname: "Marie".to_string(),
            lastname: "Curie".to_string(),
        }
    }

    #[test]
    fn verifies_matching_password_only() {
        let account = account_with_password("Password123");
        assert!(account.verify_password("Password123"));
        assert!(!account.verify_password("password123"));
    }

    #[test]
    fn empty_hash_never_verifies() {
        let mut account = account_with_password("Password123");
        account.password = String::new();
        assert!(!account.verify_password(""));
    }

    #[test]
    fn student_converts_to_account_with_student_ref() {
        let student = Student {
            id: 5,
            email: "leo@school.test".to_string(),
            password: "x".to_string(),
            firstname: "Léo".to_string(),
            lastname: "Martin".to_string(),
            birth_date: None,
            classe_id: Some(1),
            parent_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(student.user_ref(), UserRef::Student(5));
        let account = Account::from(student);
        assert_eq!(account.kind(), UserKind::Student);
        assert_eq!(account.full_name(), "Léo Martin");
    }
}
