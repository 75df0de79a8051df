//! Common repository traits
//!
//! Generic interfaces shared by the per-table repositories. Every method
//! returns `sqlx::Error` untouched so that services can propagate it with `?`
//! and let `AppError` pick the status code.

use crate::dtos::Pagination;

/// Inserts a new row and returns it with the id assigned by the database
///
/// * `Entity` - type of the stored row
/// * `CreateDTO` - data for the insert (no id)
pub trait Create<Entity, CreateDTO> {
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Reads a single row by primary key
///
/// Returns `Ok(None)` when no row matches, so callers decide whether a
/// missing row is a 404 or something else.
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Partial update: only the `Some(_)` fields of the DTO are written
///
/// Returns `sqlx::Error::RowNotFound` when the id does not exist.
pub trait Update<Entity, UpdateDTO, Id> {
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Deletes a row by primary key
///
/// Returns `sqlx::Error::RowNotFound` when nothing was deleted.
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}

/// Filtered listing with a total count, backing the paginated endpoints
///
/// * `Filter` - query parameters understood by the repository
///
/// # Returns
/// The rows of the requested page and the total number of matching rows.
pub trait Paginate<Entity, Filter> {
    async fn paginate(
        &self,
        filter: &Filter,
        pagination: Pagination,
    ) -> Result<(Vec<Entity>, i64), sqlx::Error>;
}
