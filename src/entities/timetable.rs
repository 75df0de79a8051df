//! Timetable entity - Slot settimanale ricorrente di una classe

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Timetable {
    pub timetable_id: i32,
    pub classe_id: i32,
    pub teacher_id: Option<i32>,
    pub subject: String,
    /// 1 = lunedì ... 7 = domenica
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
}

impl Timetable {
    /// Due slot nello stesso giorno si sovrappongono se gli intervalli
    /// semiaperti `[start, end)` si intersecano
    pub fn overlaps(&self, day_of_week: i32, start: NaiveTime, end: NaiveTime) -> bool {
        self.day_of_week == day_of_week && self.start_time < end && start < self.end_time
    }
}
