use super::INotificationRepo;
use chrono::NaiveDate;
use pitchin_domain::{Notification, NotificationKind, ReminderHorizon, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRaw {
    notification_uid: Uuid,
    user_uid: Uuid,
    kind: String,
    horizon: Option<String>,
    title: String,
    message: String,
    group_uid: Option<Uuid>,
    related_user_uid: Option<Uuid>,
    sent_on: NaiveDate,
}

impl NotificationRaw {
    fn into_domain(self) -> anyhow::Result<Notification> {
        let kind = self.kind.parse::<NotificationKind>()?;
        let horizon = self
            .horizon
            .map(|h| h.parse::<ReminderHorizon>())
            .transpose()?;
        Ok(Notification {
            id: self.notification_uid.into(),
            user_id: self.user_uid.into(),
            kind,
            horizon,
            title: self.title,
            message: self.message,
            group_id: self.group_uid.map(|uid| uid.into()),
            related_user_id: self.related_user_uid.map(|uid| uid.into()),
            sent_on: self.sent_on,
        })
    }
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications
            (notification_uid, user_uid, kind, horizon, title, message, group_uid, related_user_uid, sent_on)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(notification.user_id.inner_ref())
        .bind(notification.kind.to_string())
        .bind(notification.horizon.map(|h| h.to_string()))
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.group_id.as_ref().map(|id| *id.inner_ref()))
        .bind(
            notification
                .related_user_id
                .as_ref()
                .map(|id| *id.inner_ref()),
        )
        .bind(notification.sent_on)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn was_sent(
        &self,
        user_id: &ID,
        kind: NotificationKind,
        horizon: ReminderHorizon,
        day: NaiveDate,
    ) -> bool {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notifications AS n
                WHERE n.user_uid = $1
                AND n.kind = $2
                AND n.horizon = $3
                AND n.sent_on = $4
            )
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(kind.to_string())
        .bind(horizon.to_string())
        .bind(day)
        .fetch_one(&self.pool)
        .await
        .unwrap_or(false)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Notification> {
        let raw = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.user_uid = $1
            ORDER BY n.created_at
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();

        raw.into_iter()
            .filter_map(|n| match n.into_domain() {
                Ok(notification) => Some(notification),
                Err(e) => {
                    error!("Malformed notification row: {:?}", e);
                    None
                }
            })
            .collect()
    }
}
