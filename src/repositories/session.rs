//! SessionRepository - Repository per le séance

use super::{Create, Delete, Paginate, PoolType, Read, Update};
use crate::dtos::{CreateSessionDTO, Pagination, SessionQuery, UpdateSessionDTO};
use crate::entities::Session;
use sqlx::{Error, QueryBuilder, Sqlite};

const SESSION_COLUMNS: &str =
    "session_id, classe_id, teacher_id, subject, kind, starts_at, ends_at, room";

// SESSION REPO
pub struct SessionRepository {
    connection_pool: PoolType,
}

impl SessionRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &SessionQuery) {
        builder.push(" WHERE 1 = 1");
        if let Some(classe_id) = filter.classe_id {
            builder.push(" AND classe_id = ").push_bind(classe_id);
        }
        if let Some(teacher_id) = filter.teacher_id {
            builder.push(" AND teacher_id = ").push_bind(teacher_id);
        }
        if let Some(kind) = filter.kind {
            builder.push(" AND kind = ").push_bind(kind);
        }
        // finestra: sessioni che intersecano [from, to]
        if let Some(from) = filter.from {
            builder.push(" AND ends_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            builder.push(" AND starts_at <= ").push_bind(to);
        }
    }
}

impl Create<Session, CreateSessionDTO> for SessionRepository {
    async fn create(&self, data: &CreateSessionDTO) -> Result<Session, Error> {
        sqlx::query_as::<_, Session>(&format!(
            "INSERT INTO sessions (classe_id, teacher_id, subject, kind, starts_at, ends_at, room) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {SESSION_COLUMNS}"
        ))
        .bind(data.classe_id)
        .bind(data.teacher_id)
        .bind(&data.subject)
        .bind(data.kind)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(&data.room)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Session, i32> for SessionRepository {
    async fn read(&self, id: &i32) -> Result<Option<Session>, Error> {
        sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Session, UpdateSessionDTO, i32> for SessionRepository {
    async fn update(&self, id: &i32, data: &UpdateSessionDTO) -> Result<Session, Error> {
        sqlx::query_as::<_, Session>(&format!(
            "UPDATE sessions SET \
                teacher_id = COALESCE(?, teacher_id), \
                subject = COALESCE(?, subject), \
                kind = COALESCE(?, kind), \
                starts_at = COALESCE(?, starts_at), \
                ends_at = COALESCE(?, ends_at), \
                room = COALESCE(?, room) \
             WHERE session_id = ? RETURNING {SESSION_COLUMNS}"
        ))
        .bind(data.teacher_id)
        .bind(&data.subject)
        .bind(data.kind)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(&data.room)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Delete<i32> for SessionRepository {
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}

impl Paginate<Session, SessionQuery> for SessionRepository {
    async fn paginate(
        &self,
        filter: &SessionQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Session>, i64), Error> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM sessions");
        Self::push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {SESSION_COLUMNS} FROM sessions"));
        Self::push_filters(&mut select, filter);
        select
            .push(" ORDER BY starts_at, session_id LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let sessions = select
            .build_query_as::<Session>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok((sessions, total))
    }
}
