//! CalendarRepository - Repository per gli eventi del calendario

use super::{Create, Delete, PoolType, Read, Update};
use crate::dtos::{CalendarQuery, NewEventDTO, UpdateEventDTO};
use crate::entities::CalendarEvent;
use sqlx::{Error, QueryBuilder, Sqlite};

const EVENT_COLUMNS: &str =
    "event_id, title, description, starts_at, ends_at, classe_id, created_by_id, created_by_type";

pub struct CalendarRepository {
    connection_pool: PoolType,
}

impl CalendarRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Events intersecting `[from, to]`, ordered by start
    pub async fn find_window(&self, filter: &CalendarQuery) -> Result<Vec<CalendarEvent>, Error> {
        let mut select = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events WHERE 1 = 1"
        ));
        if let Some(from) = filter.from {
            select.push(" AND ends_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            select.push(" AND starts_at <= ").push_bind(to);
        }
        if let Some(classe_id) = filter.classe_id {
            // gli eventi senza classe valgono per tutta la scuola
            select
                .push(" AND (classe_id IS NULL OR classe_id = ")
                .push_bind(classe_id)
                .push(")");
        }
        select.push(" ORDER BY starts_at, event_id");
        select
            .build_query_as::<CalendarEvent>()
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Create<CalendarEvent, NewEventDTO> for CalendarRepository {
    async fn create(&self, data: &NewEventDTO) -> Result<CalendarEvent, Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            "INSERT INTO calendar_events \
                (title, description, starts_at, ends_at, classe_id, created_by_id, created_by_type) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.classe_id)
        .bind(data.created_by.id())
        .bind(data.created_by.kind())
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<CalendarEvent, i32> for CalendarRepository {
    async fn read(&self, id: &i32) -> Result<Option<CalendarEvent>, Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events WHERE event_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<CalendarEvent, UpdateEventDTO, i32> for CalendarRepository {
    async fn update(&self, id: &i32, data: &UpdateEventDTO) -> Result<CalendarEvent, Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            "UPDATE calendar_events SET \
                title = COALESCE(?, title), \
                description = COALESCE(?, description), \
                starts_at = COALESCE(?, starts_at), \
                ends_at = COALESCE(?, ends_at) \
             WHERE event_id = ? RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Delete<i32> for CalendarRepository {
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE event_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}
