//! StatisticsRepository - Aggregati in sola lettura per la dashboard

use super::PoolType;
use crate::dtos::{SubjectAverageDTO, UserCountsDTO};
use sqlx::Error;
use std::collections::BTreeMap;

// voti riportati su /20 direttamente in SQL
const ON_TWENTY: &str = "value / max_value * 20.0";

pub struct StatisticsRepository {
    connection_pool: PoolType,
}

impl StatisticsRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    async fn count(&self, table: &str) -> Result<i64, Error> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.connection_pool)
            .await
    }

    pub async fn user_counts(&self) -> Result<UserCountsDTO, Error> {
        Ok(UserCountsDTO {
            administrators: self.count("administrators").await?,
            teachers: self.count("teachers").await?,
            students: self.count("students").await?,
            parents: self.count("parents").await?,
        })
    }

    pub async fn classes(&self) -> Result<i64, Error> {
        self.count("classes").await
    }

    pub async fn sessions(&self) -> Result<i64, Error> {
        self.count("sessions").await
    }

    /// Number of grades and their coefficient-weighted average on /20
    pub async fn grades_overview(&self) -> Result<(i64, Option<f64>), Error> {
        sqlx::query_as(&format!(
            "SELECT COUNT(*), SUM(({ON_TWENTY}) * coefficient) / NULLIF(SUM(coefficient), 0) FROM grades"
        ))
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Attendance rows per status, restricted to one class when `classe_id` is `Some`
    pub async fn attendance_by_status(
        &self,
        classe_id: Option<i32>,
    ) -> Result<BTreeMap<String, i64>, Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT a.status, COUNT(*) FROM attendances a \
             JOIN sessions s ON s.session_id = a.session_id \
             WHERE ? IS NULL OR s.classe_id = ? \
             GROUP BY a.status",
        )
        .bind(classe_id)
        .bind(classe_id)
        .fetch_all(&self.connection_pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Weighted average per subject for the students of a class
    pub async fn subject_averages(&self, classe_id: &i32) -> Result<Vec<SubjectAverageDTO>, Error> {
        let rows: Vec<(String, f64, i64)> = sqlx::query_as(&format!(
            "SELECT subject, SUM(({ON_TWENTY}) * coefficient) / SUM(coefficient), COUNT(*) \
             FROM grades \
             WHERE coefficient > 0 AND student_id IN (SELECT id FROM students WHERE classe_id = ?) \
             GROUP BY subject ORDER BY subject"
        ))
        .bind(classe_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(subject, average, grades)| SubjectAverageDTO {
                subject,
                average: (average * 100.0).round() / 100.0,
                grades,
            })
            .collect())
    }
}
