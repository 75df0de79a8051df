//! AlertRepository - Storico degli avvisi

use super::{NotificationRepository, PoolType};
use crate::dtos::{CreateNotificationDTO, NewAlertDTO, Pagination};
use crate::entities::{Alert, NotificationKind, UserRef};
use sqlx::Error;
use tracing::instrument;

const ALERT_COLUMNS: &str =
    "alert_id, sender_id, sender_type, title, content, level, audience, recipients, created_at";

pub struct AlertRepository {
    connection_pool: PoolType,
}

impl AlertRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    pub async fn page(&self, pagination: Pagination) -> Result<(Vec<Alert>, i64), Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts")
            .fetch_one(&self.connection_pool)
            .await?;
        let alerts = sqlx::query_as::<_, Alert>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts ORDER BY created_at DESC, alert_id DESC LIMIT ? OFFSET ?"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.connection_pool)
        .await?;
        Ok((alerts, total))
    }

    /// Store the alert and one notification per recipient in the same transaction
    ///
    /// # Returns
    /// The stored alert and the number of notifications created
    #[instrument(skip(self, data, recipients), fields(recipients = recipients.len()))]
    pub async fn create_and_notify(
        &self,
        data: &NewAlertDTO,
        recipients: &[UserRef],
    ) -> Result<(Alert, u64), Error> {
        let mut tx = self.connection_pool.begin().await?;

        let alert = sqlx::query_as::<_, Alert>(&format!(
            "INSERT INTO alerts \
                (sender_id, sender_type, title, content, level, audience, recipients, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {ALERT_COLUMNS}"
        ))
        .bind(data.sender.id())
        .bind(data.sender.kind())
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.level)
        .bind(&data.audience)
        .bind(data.recipients)
        .bind(data.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let notifications: Vec<CreateNotificationDTO> = recipients
            .iter()
            .map(|recipient| {
                CreateNotificationDTO::new(*recipient, NotificationKind::Alert, &alert.title, &alert.content)
            })
            .collect();
        let delivered = NotificationRepository::insert_many(&mut tx, &notifications).await?;

        tx.commit().await?;
        Ok((alert, delivered))
    }
}
