//! TimetableRepository - Repository per l'orario settimanale

use super::{Create, Delete, PoolType, Read, Update};
use crate::dtos::{CreateTimetableDTO, TimetableQuery, UpdateTimetableDTO};
use crate::entities::Timetable;
use chrono::NaiveTime;
use sqlx::{Error, QueryBuilder, Sqlite};
use tracing::instrument;

const TIMETABLE_COLUMNS: &str =
    "timetable_id, classe_id, teacher_id, subject, day_of_week, start_time, end_time, room";

// TIMETABLE REPO
pub struct TimetableRepository {
    connection_pool: PoolType,
}

impl TimetableRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Slots matching the optional filters, ordered by day and start time
    pub async fn find_many(&self, filter: &TimetableQuery) -> Result<Vec<Timetable>, Error> {
        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {TIMETABLE_COLUMNS} FROM timetables WHERE 1 = 1"));
        if let Some(classe_id) = filter.classe_id {
            select.push(" AND classe_id = ").push_bind(classe_id);
        }
        if let Some(teacher_id) = filter.teacher_id {
            select.push(" AND teacher_id = ").push_bind(teacher_id);
        }
        if let Some(day) = filter.day_of_week {
            select.push(" AND day_of_week = ").push_bind(day);
        }
        select.push(" ORDER BY day_of_week, start_time, timetable_id");
        select
            .build_query_as::<Timetable>()
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Slots of the same class or the same teacher overlapping `[start, end)` on `day`
    #[instrument(skip(self))]
    pub async fn find_conflicts(
        &self,
        classe_id: i32,
        teacher_id: Option<i32>,
        day_of_week: i32,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<i32>,
    ) -> Result<Vec<Timetable>, Error> {
        let candidates = sqlx::query_as::<_, Timetable>(&format!(
            "SELECT {TIMETABLE_COLUMNS} FROM timetables \
             WHERE day_of_week = ? AND (classe_id = ? OR (? IS NOT NULL AND teacher_id = ?))"
        ))
        .bind(day_of_week)
        .bind(classe_id)
        .bind(teacher_id)
        .bind(teacher_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(candidates
            .into_iter()
            .filter(|slot| Some(slot.timetable_id) != exclude)
            .filter(|slot| slot.overlaps(day_of_week, start, end))
            .collect())
    }
}

impl Create<Timetable, CreateTimetableDTO> for TimetableRepository {
    async fn create(&self, data: &CreateTimetableDTO) -> Result<Timetable, Error> {
        sqlx::query_as::<_, Timetable>(&format!(
            "INSERT INTO timetables \
                (classe_id, teacher_id, subject, day_of_week, start_time, end_time, room) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {TIMETABLE_COLUMNS}"
        ))
        .bind(data.classe_id)
        .bind(data.teacher_id)
        .bind(&data.subject)
        .bind(data.day_of_week)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(&data.room)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Timetable, i32> for TimetableRepository {
    async fn read(&self, id: &i32) -> Result<Option<Timetable>, Error> {
        sqlx::query_as::<_, Timetable>(&format!(
            "SELECT {TIMETABLE_COLUMNS} FROM timetables WHERE timetable_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Timetable, UpdateTimetableDTO, i32> for TimetableRepository {
    async fn update(&self, id: &i32, data: &UpdateTimetableDTO) -> Result<Timetable, Error> {
        sqlx::query_as::<_, Timetable>(&format!(
            "UPDATE timetables SET \
                teacher_id = COALESCE(?, teacher_id), \
                subject = COALESCE(?, subject), \
                day_of_week = COALESCE(?, day_of_week), \
                start_time = COALESCE(?, start_time), \
                end_time = COALESCE(?, end_time), \
                room = COALESCE(?, room) \
             WHERE timetable_id = ? RETURNING {TIMETABLE_COLUMNS}"
        ))
        .bind(data.teacher_id)
        .bind(&data.subject)
        .bind(data.day_of_week)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(&data.room)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Delete<i32> for TimetableRepository {
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM timetables WHERE timetable_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}
