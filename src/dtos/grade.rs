//! Grade DTOs - Data Transfer Objects per i voti

use crate::entities::Grade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn validate_value(grade: &CreateGradeDTO) -> Result<(), ValidationError> {
    let max_value = grade.max_value.unwrap_or(20.0);
    if max_value <= 0.0 || grade.value < 0.0 || grade.value > max_value {
        return Err(ValidationError::new("value_out_of_range"));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_value", message = "value must be between 0 and max_value"))]
pub struct CreateGradeDTO {
    pub student_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    pub value: f64,
    pub max_value: Option<f64>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub coefficient: Option<f64>,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
    /// Solo per gli amministratori: insegnante a cui attribuire il voto
    pub teacher_id: Option<i32>,
}

/// Voto pronto per l'inserimento
#[derive(Debug, Clone)]
pub struct NewGradeDTO {
    pub student_id: i32,
    pub teacher_id: Option<i32>,
    pub subject: String,
    pub value: f64,
    pub max_value: f64,
    pub coefficient: f64,
    pub comment: Option<String>,
    pub graded_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateGradeDTO {
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    pub value: Option<f64>,
    pub max_value: Option<f64>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub coefficient: Option<f64>,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StudentGradesDTO {
    pub student_id: i32,
    /// Media pesata su /20, `null` senza voti
    pub average: Option<f64>,
    pub grades: Vec<Grade>,
}
