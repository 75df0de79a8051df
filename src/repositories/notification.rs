//! NotificationRepository - Notifiche indirizzate tramite `(recipient_id, recipient_type)`

use super::{Create, PoolType};
use crate::dtos::{CreateNotificationDTO, Pagination};
use crate::entities::{Notification, UserRef};
use sqlx::{Error, QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, instrument};

const NOTIFICATION_COLUMNS: &str =
    "notification_id, recipient_id, recipient_type, kind, title, content, is_read, created_at";

pub struct NotificationRepository {
    connection_pool: PoolType,
}

impl NotificationRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    /// Persist one notification per item inside a single transaction
    #[instrument(skip(self, data), fields(count = data.len()))]
    pub async fn create_many(&self, data: &[CreateNotificationDTO]) -> Result<u64, Error> {
        let mut tx = self.connection_pool.begin().await?;
        let inserted = Self::insert_many(&mut tx, data).await?;
        tx.commit().await?;
        debug!("Inserted {} notifications", inserted);
        Ok(inserted)
    }

    /// Insert on a connection the caller owns, typically an open transaction
    pub async fn insert_many(
        conn: &mut SqliteConnection,
        data: &[CreateNotificationDTO],
    ) -> Result<u64, Error> {
        let mut inserted = 0;
        for notification in data {
            inserted += sqlx::query(
                "INSERT INTO notifications \
                    (recipient_id, recipient_type, kind, title, content, is_read, created_at) \
                 VALUES (?, ?, ?, ?, ?, 0, ?)",
            )
            .bind(notification.recipient.id())
            .bind(notification.recipient.kind())
            .bind(notification.kind)
            .bind(&notification.title)
            .bind(&notification.content)
            .bind(notification.created_at)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        }
        Ok(inserted)
    }

    pub async fn page_for(
        &self,
        recipient: &UserRef,
        unread_only: bool,
        pagination: Pagination,
    ) -> Result<(Vec<Notification>, i64), Error> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM notifications");
        push_filters(&mut count, recipient, unread_only);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications"));
        push_filters(&mut select, recipient, unread_only);
        select
            .push(" ORDER BY created_at DESC, notification_id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let notifications = select
            .build_query_as::<Notification>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok((notifications, total))
    }

    pub async fn count_unread(&self, recipient: &UserRef) -> Result<i64, Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE recipient_id = ? AND recipient_type = ? AND is_read = 0",
        )
        .bind(recipient.id())
        .bind(recipient.kind())
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Returns `RowNotFound` when the notification does not belong to `recipient`
    pub async fn mark_read(&self, id: &i32, recipient: &UserRef) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET is_read = 1 \
             WHERE notification_id = ? AND recipient_id = ? AND recipient_type = ? \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(recipient.id())
        .bind(recipient.kind())
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }

    pub async fn mark_all_read(&self, recipient: &UserRef) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 \
             WHERE recipient_id = ? AND recipient_type = ? AND is_read = 0",
        )
        .bind(recipient.id())
        .bind(recipient.kind())
        .execute(&self.connection_pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_owned(&self, id: &i32, recipient: &UserRef) -> Result<(), Error> {
        let result = sqlx::query(
            "DELETE FROM notifications \
             WHERE notification_id = ? AND recipient_id = ? AND recipient_type = ?",
        )
        .bind(id)
        .bind(recipient.id())
        .bind(recipient.kind())
        .execute(&self.connection_pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, recipient: &UserRef, unread_only: bool) {
    builder
        .push(" WHERE recipient_id = ")
        .push_bind(recipient.id())
        .push(" AND recipient_type = ")
        .push_bind(recipient.kind());
    if unread_only {
        builder.push(" AND is_read = 0");
    }
}

impl Create<Notification, CreateNotificationDTO> for NotificationRepository {
    async fn create(&self, data: &CreateNotificationDTO) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications \
                (recipient_id, recipient_type, kind, title, content, is_read, created_at) \
             VALUES (?, ?, ?, ?, ?, 0, ?) RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(data.recipient.id())
        .bind(data.recipient.kind())
        .bind(data.kind)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.created_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}
