//! GradeRepository - Repository per i voti

use super::{Create, Delete, PoolType, Read, Update};
use crate::dtos::{GradeQuery, NewGradeDTO, Pagination, UpdateGradeDTO};
use crate::entities::Grade;
use sqlx::{Error, QueryBuilder, Sqlite};

const GRADE_COLUMNS: &str =
    "grade_id, student_id, teacher_id, subject, value, max_value, coefficient, comment, graded_at";

// GRADE REPO
pub struct GradeRepository {
    connection_pool: PoolType,
}

impl GradeRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    pub async fn find_many_by_student(&self, student_id: &i32) -> Result<Vec<Grade>, Error> {
        sqlx::query_as::<_, Grade>(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades WHERE student_id = ? ORDER BY graded_at DESC, grade_id DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Grades of every student currently enrolled in the class
    pub async fn find_many_by_classe(&self, classe_id: &i32) -> Result<Vec<Grade>, Error> {
        sqlx::query_as::<_, Grade>(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades \
             WHERE student_id IN (SELECT id FROM students WHERE classe_id = ?) \
             ORDER BY subject, grade_id"
        ))
        .bind(classe_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Filtered page of grades, restricted to the given students when `students` is `Some`
    pub async fn paginate_visible(
        &self,
        filter: &GradeQuery,
        students: Option<&[i32]>,
        pagination: Pagination,
    ) -> Result<(Vec<Grade>, i64), Error> {
        if students.is_some_and(|ids| ids.is_empty()) {
            return Ok((Vec::new(), 0));
        }

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM grades");
        push_filters(&mut count, filter, students);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {GRADE_COLUMNS} FROM grades"));
        push_filters(&mut select, filter, students);
        select
            .push(" ORDER BY graded_at DESC, grade_id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let grades = select
            .build_query_as::<Grade>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok((grades, total))
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &GradeQuery, students: Option<&[i32]>) {
    builder.push(" WHERE 1 = 1");
    if let Some(student_id) = filter.student_id {
        builder.push(" AND student_id = ").push_bind(student_id);
    }
    if let Some(classe_id) = filter.classe_id {
        builder
            .push(" AND student_id IN (SELECT id FROM students WHERE classe_id = ")
            .push_bind(classe_id)
            .push(")");
    }
    if let Some(subject) = filter.subject.clone() {
        builder.push(" AND subject = ").push_bind(subject);
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

impl Create<Grade, NewGradeDTO> for GradeRepository {
    async fn create(&self, data: &NewGradeDTO) -> Result<Grade, Error> {
        sqlx::query_as::<_, Grade>(&format!(
            "INSERT INTO grades \
                (student_id, teacher_id, subject, value, max_value, coefficient, comment, graded_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {GRADE_COLUMNS}"
        ))
        .bind(data.student_id)
        .bind(data.teacher_id)
        .bind(&data.subject)
        .bind(data.value)
        .bind(data.max_value)
        .bind(data.coefficient)
        .bind(&data.comment)
        .bind(data.graded_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Grade, i32> for GradeRepository {
    async fn read(&self, id: &i32) -> Result<Option<Grade>, Error> {
        sqlx::query_as::<_, Grade>(&format!("SELECT {GRADE_COLUMNS} FROM grades WHERE grade_id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Grade, UpdateGradeDTO, i32> for GradeRepository {
    /// A value above the (new) max_value trips the table CHECK and surfaces as 400
    async fn update(&self, id: &i32, data: &UpdateGradeDTO) -> Result<Grade, Error> {
        sqlx::query_as::<_, Grade>(&format!(
            "UPDATE grades SET \
                subject = COALESCE(?, subject), \
                value = COALESCE(?, value), \
                max_value = COALESCE(?, max_value), \
                coefficient = COALESCE(?, coefficient), \
                comment = COALESCE(?, comment) \
             WHERE grade_id = ? RETURNING {GRADE_COLUMNS}"
        ))
        .bind(&data.subject)
        .bind(data.value)
        .bind(data.max_value)
        .bind(data.coefficient)
        .bind(&data.comment)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Delete<i32> for GradeRepository {
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM grades WHERE grade_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}
