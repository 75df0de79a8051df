//! Classe DTOs - Data Transfer Objects per le classi

use crate::entities::Classe;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug)]
pub struct ClasseDTO {
    pub classe_id: i32,
    pub name: String,
    pub level: String,
    pub academic_year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_count: Option<i64>,
}

impl From<Classe> for ClasseDTO {
    fn from(value: Classe) -> Self {
        Self {
            classe_id: value.classe_id,
            name: value.name,
            level: value.level,
            academic_year: value.academic_year,
            student_count: None, // popolato solo nel dettaglio
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateClasseDTO {
    #[validate(length(min = 1, max = 50, message = "Class name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub level: String,
    #[validate(length(min = 4, max = 20))]
    pub academic_year: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateClasseDTO {
    #[validate(length(min = 1, max = 50, message = "Class name must be between 1 and 50 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub level: Option<String>,
    #[validate(length(min = 4, max = 20))]
    pub academic_year: Option<String>,
}
