//! Statistics DTOs - Aggregati per la dashboard

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UserCountsDTO {
    pub administrators: i64,
    pub teachers: i64,
    pub students: i64,
    pub parents: i64,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct OverviewStatsDTO {
    pub users: UserCountsDTO,
    pub classes: i64,
    pub sessions: i64,
    pub grades: i64,
    /// Media dei voti su /20
    pub average_grade: Option<f64>,
    /// Conteggio presenze per stato (present, absent, late, excused)
    pub attendance: BTreeMap<String, i64>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubjectAverageDTO {
    pub subject: String,
    pub average: f64,
    pub grades: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ClasseStatsDTO {
    pub classe_id: i32,
    pub name: String,
    pub students: i64,
    pub average_grade: Option<f64>,
    pub subjects: Vec<SubjectAverageDTO>,
    /// Quota di presenze registrate come assenza, fra 0 e 1
    pub absence_rate: Option<f64>,
}
