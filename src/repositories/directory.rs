//! DirectoryRepository - Risoluzione dei riferimenti polimorfici `(id, tipo)`
//!
//! È l'unico punto che sa in quale tabella vive un `UserRef`: ogni entità
//! che punta a "un utente di qualsiasi tipo" passa da qui invece di fare il
//! proprio switch sul discriminatore.

use super::{PoolType, like_pattern};
use crate::dtos::Pagination;
use crate::entities::{Account, UserKind, UserRef};
use futures::future::try_join_all;
use sqlx::sqlite::SqliteRow;
use sqlx::{Error, QueryBuilder, Row, Sqlite};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const ACCOUNT_COLUMNS: &str = "id, email, password, firstname, lastname";

fn account_from_row(kind: UserKind, row: &SqliteRow) -> Result<Account, Error> {
    Ok(Account {
        user: UserRef::new(kind, row.try_get("id")?),
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        firstname: row.try_get("firstname")?,
        lastname: row.try_get("lastname")?,
    })
}

pub struct DirectoryRepository {
    connection_pool: PoolType,
}

impl DirectoryRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Resolve a polymorphic reference against the table named by its kind
    ///
    /// # Returns
    /// * `Ok(Some(Account))` - the referenced user exists
    /// * `Ok(None)` - dangling reference (no row in that table)
    pub async fn resolve(&self, user: &UserRef) -> Result<Option<Account>, Error> {
        let kind = user.kind();
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM {} WHERE id = ?",
            kind.table()
        ))
        .bind(user.id())
        .fetch_optional(&self.connection_pool)
        .await?;

        row.map(|row| account_from_row(kind, &row)).transpose()
    }

    /// Resolve many references in parallel; dangling ones are absent from the map
    pub async fn resolve_many(
        &self,
        users: &[UserRef],
    ) -> Result<HashMap<UserRef, Account>, Error> {
        let mut unique: Vec<UserRef> = users.to_vec();
        unique.sort_by_key(|u| (u.kind().as_str(), u.id()));
        unique.dedup();

        let accounts = try_join_all(unique.iter().map(|user| self.resolve(user))).await?;

        Ok(accounts
            .into_iter()
            .flatten()
            .map(|account| (account.user, account))
            .collect())
    }

    pub async fn exists(&self, user: &UserRef) -> Result<bool, Error> {
        Ok(self.resolve(user).await?.is_some())
    }

    /// Find a user of any kind by email (used by login)
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        for kind in UserKind::ALL {
            let row = sqlx::query(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM {} WHERE email = ?",
                kind.table()
            ))
            .bind(email)
            .fetch_optional(&self.connection_pool)
            .await?;

            if let Some(row) = row {
                debug!("Email found in {}", kind.table());
                return account_from_row(kind, &row).map(Some);
            }
        }
        Ok(None)
    }

    /// Emails are unique across the four tables; `except` ignores the user being updated
    pub async fn email_taken(&self, email: &str, except: Option<UserRef>) -> Result<bool, Error> {
        Ok(match self.find_by_email(email).await? {
            Some(account) => Some(account.user) != except,
            None => false,
        })
    }

    fn push_union<'a>(
        builder: &mut QueryBuilder<'a, Sqlite>,
        kinds: &[UserKind],
        search: Option<&str>,
    ) {
        for (i, kind) in kinds.iter().enumerate() {
            if i > 0 {
                builder.push(" UNION ALL ");
            }
            builder.push(format!(
                "SELECT {ACCOUNT_COLUMNS}, '{}' AS kind FROM {}",
                kind.as_str(),
                kind.table()
            ));
            if let Some(search) = search {
                builder
                    .push(" WHERE (firstname || ' ' || lastname || ' ' || email) LIKE ")
                    .push_bind(like_pattern(search))
                    .push(" ESCAPE '\\'");
            }
        }
    }

    /// Paginated listing across one or all user tables, ordered by name
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        kind: Option<UserKind>,
        search: Option<&str>,
        pagination: Pagination,
    ) -> Result<(Vec<Account>, i64), Error> {
        let kinds: Vec<UserKind> = match kind {
            Some(kind) => vec![kind],
            None => UserKind::ALL.to_vec(),
        };
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM (");
        Self::push_union(&mut count, &kinds, search);
        count.push(")");
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM (");
        Self::push_union(&mut select, &kinds, search);
        select
            .push(") ORDER BY lastname, firstname, kind, id LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = select.build().fetch_all(&self.connection_pool).await?;
        let accounts = rows
            .iter()
            .map(|row| {
                let kind: UserKind = row.try_get("kind")?;
                account_from_row(kind, row)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok((accounts, total))
    }

    /// Every user of one kind, as references (alert fan-out)
    pub async fn list_refs(&self, kind: UserKind) -> Result<Vec<UserRef>, Error> {
        let ids: Vec<i32> = sqlx::query_scalar(&format!("SELECT id FROM {} ORDER BY id", kind.table()))
            .fetch_all(&self.connection_pool)
            .await?;
        Ok(ids.into_iter().map(|id| UserRef::new(kind, id)).collect())
    }

    /// Delete a user and the rows that point at it through a discriminator pair,
    /// all in one transaction.
    ///
    /// Notifications and participations go away; conversations left without
    /// participants are deleted (their messages cascade). Messages the user sent
    /// elsewhere are kept and their sender resolves to `None` afterwards.
    ///
    /// Returns `RowNotFound` when the user does not exist.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn delete_user(&self, user: &UserRef) -> Result<(), Error> {
        let mut tx = self.connection_pool.begin().await?;

        let deleted = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", user.kind().table()))
            .bind(user.id())
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        let notifications = sqlx::query(
            "DELETE FROM notifications WHERE recipient_id = ? AND recipient_type = ?",
        )
        .bind(user.id())
        .bind(user.kind())
        .execute(&mut *tx)
        .await?;

        let participations = sqlx::query(
            "DELETE FROM conversation_participants WHERE user_id = ? AND user_type = ?",
        )
        .bind(user.id())
        .bind(user.kind())
        .execute(&mut *tx)
        .await?;

        let conversations = sqlx::query(
            "DELETE FROM conversations WHERE NOT EXISTS ( \
                SELECT 1 FROM conversation_participants p \
                WHERE p.conversation_id = conversations.conversation_id)",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Purged {} notifications, {} participations and {} empty conversations",
            notifications.rows_affected(),
            participations.rows_affected(),
            conversations.rows_affected()
        );
        Ok(())
    }
}
