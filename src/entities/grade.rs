//! Grade entity - Voto assegnato a uno studente

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Grade {
    pub grade_id: i32,
    pub student_id: i32,
    pub teacher_id: Option<i32>,
    pub subject: String,
    pub value: f64,
    pub max_value: f64,
    pub coefficient: f64,
    pub comment: Option<String>,
    pub graded_at: DateTime<Utc>,
}

impl Grade {
    /// Voto riportato su scala /20
    pub fn on_twenty(&self) -> f64 {
        if self.max_value <= 0.0 {
            return 0.0;
        }
        self.value / self.max_value * 20.0
    }
}

/// Media pesata sui coefficienti, su scala /20. `None` se non ci sono voti
/// con coefficiente positivo.
pub fn weighted_average(grades: &[Grade]) -> Option<f64> {
    let (sum, weights) = grades
        .iter()
        .filter(|g| g.coefficient > 0.0)
        .fold((0.0, 0.0), |(sum, weights), g| {
            (sum + g.on_twenty() * g.coefficient, weights + g.coefficient)
        });
    if weights == 0.0 {
        None
    } else {
        Some((sum / weights * 100.0).round() / 100.0)
    }
}
