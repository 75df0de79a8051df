//! AttendanceRepository - Repository per il registro presenze

use super::{Paginate, PoolType, Read};
use crate::dtos::{AttendanceQuery, Pagination, RecordAttendanceDTO};
use crate::entities::Attendance;
use sqlx::{Error, QueryBuilder, Sqlite};
use tracing::{debug, instrument};

const ATTENDANCE_COLUMNS: &str =
    "attendance_id, session_id, student_id, status, comment, recorded_at";

// ATTENDANCE REPO
pub struct AttendanceRepository {
    connection_pool: PoolType,
}

impl AttendanceRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Insert or overwrite the attendance of one student for one session
    #[instrument(skip(self, data), fields(session_id = data.session_id, student_id = data.student_id))]
    pub async fn upsert(&self, data: &RecordAttendanceDTO) -> Result<Attendance, Error> {
        debug!("Upserting attendance with status {:?}", data.status);
        sqlx::query_as::<_, Attendance>(&format!(
            "INSERT INTO attendances (session_id, student_id, status, comment, recorded_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (session_id, student_id) DO UPDATE SET \
                status = excluded.status, \
                comment = excluded.comment, \
                recorded_at = excluded.recorded_at \
             RETURNING {ATTENDANCE_COLUMNS}"
        ))
        .bind(data.session_id)
        .bind(data.student_id)
        .bind(data.status)
        .bind(&data.comment)
        .bind(data.recorded_at)
        .fetch_one(&self.connection_pool)
        .await
    }

    pub async fn find_many_by_session(&self, session_id: &i32) -> Result<Vec<Attendance>, Error> {
        sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendances WHERE session_id = ? ORDER BY student_id"
        ))
        .bind(session_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Like `paginate`, restricted to the given students when `students` is `Some`
    pub async fn paginate_visible(
        &self,
        filter: &AttendanceQuery,
        students: Option<&[i32]>,
        pagination: Pagination,
    ) -> Result<(Vec<Attendance>, i64), Error> {
        if students.is_some_and(|ids| ids.is_empty()) {
            return Ok((Vec::new(), 0));
        }

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM attendances");
        push_filters(&mut count, filter, students);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {ATTENDANCE_COLUMNS} FROM attendances"));
        push_filters(&mut select, filter, students);
        select
            .push(" ORDER BY recorded_at DESC, attendance_id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let rows = select
            .build_query_as::<Attendance>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok((rows, total))
    }
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Sqlite>,
    filter: &AttendanceQuery,
    students: Option<&[i32]>,
) {
    builder.push(" WHERE 1 = 1");
    if let Some(student_id) = filter.student_id {
        builder.push(" AND student_id = ").push_bind(student_id);
    }
    if let Some(session_id) = filter.session_id {
        builder.push(" AND session_id = ").push_bind(session_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(ids) = students {
        builder.push(" AND student_id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }
}

impl Read<Attendance, i32> for AttendanceRepository {
    async fn read(&self, id: &i32) -> Result<Option<Attendance>, Error> {
        sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendances WHERE attendance_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Paginate<Attendance, AttendanceQuery> for AttendanceRepository {
    async fn paginate(
        &self,
        filter: &AttendanceQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Attendance>, i64), Error> {
        self.paginate_visible(filter, None, pagination).await
    }
}
