//! Account repositories - Una repository per ciascuna delle quattro tabelle utente

use super::{Create, Paginate, PoolType, Read, Update, like_pattern};
use crate::dtos::{
    NewAccountDTO, NewParentDTO, NewStudentDTO, NewTeacherDTO, Pagination, StudentListQuery,
    UpdateUserDTO,
};
use crate::entities::{Administrator, ParentUser, Student, Teacher};
use sqlx::{Error, QueryBuilder, Sqlite};
use tracing::{debug, instrument};

const ADMINISTRATOR_COLUMNS: &str = "id, email, password, firstname, lastname, created_at";
const TEACHER_COLUMNS: &str = "id, email, password, firstname, lastname, subject, created_at";
const PARENT_COLUMNS: &str = "id, email, password, firstname, lastname, phone, created_at";
const STUDENT_COLUMNS: &str =
    "id, email, password, firstname, lastname, birth_date, classe_id, parent_id, created_at";

// ADMINISTRATOR REPO
pub struct AdministratorRepository {
    connection_pool: PoolType,
}

impl AdministratorRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    pub async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM administrators")
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Create<Administrator, NewAccountDTO> for AdministratorRepository {
    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn create(&self, data: &NewAccountDTO) -> Result<Administrator, Error> {
        debug!("Inserting administrator");
        sqlx::query_as::<_, Administrator>(&format!(
            "INSERT INTO administrators (email, password, firstname, lastname, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {ADMINISTRATOR_COLUMNS}"
        ))
        .bind(&data.email)
        .bind(&data.password)
        .bind(&data.firstname)
        .bind(&data.lastname)
        .bind(data.created_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Administrator, i32> for AdministratorRepository {
    async fn read(&self, id: &i32) -> Result<Option<Administrator>, Error> {
        sqlx::query_as::<_, Administrator>(&format!(
            "SELECT {ADMINISTRATOR_COLUMNS} FROM administrators WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Administrator, UpdateUserDTO, i32> for AdministratorRepository {
    async fn update(&self, id: &i32, data: &UpdateUserDTO) -> Result<Administrator, Error> {
        sqlx::query_as::<_, Administrator>(&format!(
            "UPDATE administrators SET \
                email = COALESCE(?, email), \
                password = COALESCE(?, password), \
                firstname = COALESCE(?, firstname), \
                lastname = COALESCE(?, lastname) \
             WHERE id = ? RETURNING {ADMINISTRATOR_COLUMNS}"
        ))
        .bind(&data.email)
        .bind(&data.password)
        .bind(&data.firstname)
        .bind(&data.lastname)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

// TEACHER REPO
pub struct TeacherRepository {
    connection_pool: PoolType,
}

impl TeacherRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }
}

impl Create<Teacher, NewTeacherDTO> for TeacherRepository {
    #[instrument(skip(self, data), fields(email = %data.account.email))]
    async fn create(&self, data: &NewTeacherDTO) -> Result<Teacher, Error> {
        debug!("Inserting teacher");
        sqlx::query_as::<_, Teacher>(&format!(
            "INSERT INTO teachers (email, password, firstname, lastname, subject, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {TEACHER_COLUMNS}"
        ))
        .bind(&data.account.email)
        .bind(&data.account.password)
        .bind(&data.account.firstname)
        .bind(&data.account.lastname)
        .bind(&data.subject)
        .bind(data.account.created_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Teacher, i32> for TeacherRepository {
    async fn read(&self, id: &i32) -> Result<Option<Teacher>, Error> {
        sqlx::query_as::<_, Teacher>(&format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Teacher, UpdateUserDTO, i32> for TeacherRepository {
    async fn update(&self, id: &i32, data: &UpdateUserDTO) -> Result<Teacher, Error> {
        sqlx::query_as::<_, Teacher>(&format!(
            "UPDATE teachers SET \
                email = COALESCE(?, email), \
                password = COALESCE(?, password), \
                firstname = COALESCE(?, firstname), \
                lastname = COALESCE(?, lastname), \
                subject = COALESCE(?, subject) \
             WHERE id = ? RETURNING {TEACHER_COLUMNS}"
        ))
        .bind(&data.email)
        .bind(&data.password)
        .bind(&data.firstname)
        .bind(&data.lastname)
        .bind(&data.subject)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

// PARENT REPO
pub struct ParentRepository {
    connection_pool: PoolType,
}

impl ParentRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }
}

impl Create<ParentUser, NewParentDTO> for ParentRepository {
    #[instrument(skip(self, data), fields(email = %data.account.email))]
    async fn create(&self, data: &NewParentDTO) -> Result<ParentUser, Error> {
        debug!("Inserting parent");
        sqlx::query_as::<_, ParentUser>(&format!(
            "INSERT INTO parents (email, password, firstname, lastname, phone, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {PARENT_COLUMNS}"
        ))
        .bind(&data.account.email)
        .bind(&data.account.password)
        .bind(&data.account.firstname)
        .bind(&data.account.lastname)
        .bind(&data.phone)
        .bind(data.account.created_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<ParentUser, i32> for ParentRepository {
    async fn read(&self, id: &i32) -> Result<Option<ParentUser>, Error> {
        sqlx::query_as::<_, ParentUser>(&format!("SELECT {PARENT_COLUMNS} FROM parents WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<ParentUser, UpdateUserDTO, i32> for ParentRepository {
    async fn update(&self, id: &i32, data: &UpdateUserDTO) -> Result<ParentUser, Error> {
        sqlx::query_as::<_, ParentUser>(&format!(
            "UPDATE parents SET \
                email = COALESCE(?, email), \
                password = COALESCE(?, password), \
                firstname = COALESCE(?, firstname), \
                lastname = COALESCE(?, lastname), \
                phone = COALESCE(?, phone) \
             WHERE id = ? RETURNING {PARENT_COLUMNS}"
        ))
        .bind(&data.email)
        .bind(&data.password)
        .bind(&data.firstname)
        .bind(&data.lastname)
        .bind(&data.phone)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

// STUDENT REPO
pub struct StudentRepository {
    connection_pool: PoolType,
}

impl StudentRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// All students of a class, ordered by name
    pub async fn find_many_by_classe(&self, classe_id: &i32) -> Result<Vec<Student>, Error> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE classe_id = ? ORDER BY lastname, firstname"
        ))
        .bind(classe_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Children of a parent
    pub async fn find_many_by_parent(&self, parent_id: &i32) -> Result<Vec<Student>, Error> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE parent_id = ? ORDER BY lastname, firstname"
        ))
        .bind(parent_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn count_by_classe(&self, classe_id: &i32) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE classe_id = ?")
            .bind(classe_id)
            .fetch_one(&self.connection_pool)
            .await
    }

    /// Assign or clear the class of a student
    #[instrument(skip(self))]
    pub async fn assign_classe(
        &self,
        student_id: &i32,
        classe_id: Option<i32>,
    ) -> Result<Student, Error> {
        sqlx::query_as::<_, Student>(&format!(
            "UPDATE students SET classe_id = ? WHERE id = ? RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(classe_id)
        .bind(student_id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }

    /// Link or unlink the parent of a student
    #[instrument(skip(self))]
    pub async fn assign_parent(
        &self,
        student_id: &i32,
        parent_id: Option<i32>,
    ) -> Result<Student, Error> {
        sqlx::query_as::<_, Student>(&format!(
            "UPDATE students SET parent_id = ? WHERE id = ? RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(parent_id)
        .bind(student_id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }

    fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a StudentListQuery) {
        builder.push(" WHERE 1 = 1");
        if let Some(classe_id) = filter.classe_id {
            builder.push(" AND classe_id = ").push_bind(classe_id);
        }
        if let Some(parent_id) = filter.parent_id {
            builder.push(" AND parent_id = ").push_bind(parent_id);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND (firstname || ' ' || lastname || ' ' || email) LIKE ")
                .push_bind(like_pattern(search.trim()))
                .push(" ESCAPE '\\'");
        }
    }
}

impl Create<Student, NewStudentDTO> for StudentRepository {
    #[instrument(skip(self, data), fields(email = %data.account.email))]
    async fn create(&self, data: &NewStudentDTO) -> Result<Student, Error> {
        debug!("Inserting student");
        sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO students \
                (email, password, firstname, lastname, birth_date, classe_id, parent_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(&data.account.email)
        .bind(&data.account.password)
        .bind(&data.account.firstname)
        .bind(&data.account.lastname)
        .bind(data.birth_date)
        .bind(data.classe_id)
        .bind(data.parent_id)
        .bind(data.account.created_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Student, i32> for StudentRepository {
    async fn read(&self, id: &i32) -> Result<Option<Student>, Error> {
        sqlx::query_as::<_, Student>(&format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Student, UpdateUserDTO, i32> for StudentRepository {
    async fn update(&self, id: &i32, data: &UpdateUserDTO) -> Result<Student, Error> {
        sqlx::query_as::<_, Student>(&format!(
            "UPDATE students SET \
                email = COALESCE(?, email), \
                password = COALESCE(?, password), \
                firstname = COALESCE(?, firstname), \
                lastname = COALESCE(?, lastname), \
                birth_date = COALESCE(?, birth_date) \
             WHERE id = ? RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(&data.email)
        .bind(&data.password)
        .bind(&data.firstname)
        .bind(&data.lastname)
        .bind(data.birth_date)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Paginate<Student, StudentListQuery> for StudentRepository {
    #[instrument(skip(self))]
    async fn paginate(
        &self,
        filter: &StudentListQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Student>, i64), Error> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM students");
        Self::push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {STUDENT_COLUMNS} FROM students"));
        Self::push_filters(&mut select, filter);
        select
            .push(" ORDER BY lastname, firstname, id LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let students = select
            .build_query_as::<Student>()
            .fetch_all(&self.connection_pool)
            .await?;

        debug!("Found {} of {} students", students.len(), total);
        Ok((students, total))
    }
}
