//! ClasseRepository - Repository per la gestione delle classi

use super::{Create, Delete, Paginate, PoolType, Read, Update, like_pattern};
use crate::dtos::{ClasseListQuery, CreateClasseDTO, Pagination, UpdateClasseDTO};
use crate::entities::Classe;
use sqlx::{Error, QueryBuilder, Sqlite};
use tracing::{debug, instrument};

const CLASSE_COLUMNS: &str = "classe_id, name, level, academic_year";

// CLASSE REPO
pub struct ClasseRepository {
    connection_pool: PoolType,
}

impl ClasseRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Classe>, Error> {
        sqlx::query_as::<_, Classe>(&format!("SELECT {CLASSE_COLUMNS} FROM classes WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.connection_pool)
            .await
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ClasseListQuery) {
        builder.push(" WHERE 1 = 1");
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND name LIKE ")
                .push_bind(like_pattern(search.trim()))
                .push(" ESCAPE '\\'");
        }
        if let Some(level) = filter.level.clone() {
            builder.push(" AND level = ").push_bind(level);
        }
    }
}

impl Create<Classe, CreateClasseDTO> for ClasseRepository {
    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn create(&self, data: &CreateClasseDTO) -> Result<Classe, Error> {
        debug!("Inserting class");
        sqlx::query_as::<_, Classe>(&format!(
            "INSERT INTO classes (name, level, academic_year) VALUES (?, ?, ?) RETURNING {CLASSE_COLUMNS}"
        ))
        .bind(&data.name)
        .bind(&data.level)
        .bind(&data.academic_year)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Classe, i32> for ClasseRepository {
    async fn read(&self, id: &i32) -> Result<Option<Classe>, Error> {
        sqlx::query_as::<_, Classe>(&format!(
            "SELECT {CLASSE_COLUMNS} FROM classes WHERE classe_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Classe, UpdateClasseDTO, i32> for ClasseRepository {
    async fn update(&self, id: &i32, data: &UpdateClasseDTO) -> Result<Classe, Error> {
        sqlx::query_as::<_, Classe>(&format!(
            "UPDATE classes SET \
                name = COALESCE(?, name), \
                level = COALESCE(?, level), \
                academic_year = COALESCE(?, academic_year) \
             WHERE classe_id = ? RETURNING {CLASSE_COLUMNS}"
        ))
        .bind(&data.name)
        .bind(&data.level)
        .bind(&data.academic_year)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Delete<i32> for ClasseRepository {
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM classes WHERE classe_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}

impl Paginate<Classe, ClasseListQuery> for ClasseRepository {
    async fn paginate(
        &self,
        filter: &ClasseListQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Classe>, i64), Error> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM classes");
        Self::push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {CLASSE_COLUMNS} FROM classes"));
        Self::push_filters(&mut select, filter);
        select
            .push(" ORDER BY name LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let classes = select
            .build_query_as::<Classe>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok((classes, total))
    }
}
