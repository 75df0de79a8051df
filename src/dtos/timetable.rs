//! Timetable DTOs - Data Transfer Objects per l'orario settimanale

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn validate_slot(slot: &CreateTimetableDTO) -> Result<(), ValidationError> {
    if slot.start_time >= slot.end_time {
        return Err(ValidationError::new("start_time_after_end_time"));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_slot", message = "start_time must precede end_time"))]
pub struct CreateTimetableDTO {
    pub classe_id: i32,
    pub teacher_id: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(range(min = 1, max = 7, message = "day_of_week must be between 1 and 7"))]
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[validate(length(max = 50))]
    pub room: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateTimetableDTO {
    pub teacher_id: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    #[validate(range(min = 1, max = 7, message = "day_of_week must be between 1 and 7"))]
    pub day_of_week: Option<i32>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[validate(length(max = 50))]
    pub room: Option<String>,
}
