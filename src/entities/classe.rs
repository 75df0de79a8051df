//! Classe entity - Classe scolastica che raggruppa gli studenti

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Classe {
    pub classe_id: i32,
    pub name: String,
    pub level: String,
    pub academic_year: String,
}
