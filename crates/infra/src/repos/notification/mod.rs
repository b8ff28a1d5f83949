mod inmemory;
mod postgres;

use chrono::NaiveDate;
pub use inmemory::InMemoryNotificationRepo;
use pitchin_domain::{Notification, NotificationKind, ReminderHorizon, ID};
pub use postgres::PostgresNotificationRepo;

#[async_trait::async_trait]
pub trait INotificationRepo: Send + Sync {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()>;
    /// Whether a reminder of this kind and horizon was already
    /// delivered to the user on the given day. The structured key
    /// guarantees at-most-once delivery per horizon per day.
    async fn was_sent(
        &self,
        user_id: &ID,
        kind: NotificationKind,
        horizon: ReminderHorizon,
        day: NaiveDate,
    ) -> bool;
    async fn find_by_user(&self, user_id: &ID) -> Vec<Notification>;
}

#[cfg(test)]
mod tests {
    use crate::setup_context_inmemory;
    use chrono::NaiveDate;
    use pitchin_domain::{Notification, NotificationKind, ReminderHorizon, ID};

    #[tokio::test]
    async fn sent_marker_is_keyed_on_kind_horizon_and_day() {
        let ctx = setup_context_inmemory();
        let user_id = ID::new();
        let day = NaiveDate::from_ymd(2024, 6, 14);

        let notification = Notification {
            id: Default::default(),
            user_id: user_id.clone(),
            kind: NotificationKind::ContributionReminder,
            horizon: Some(ReminderHorizon::OneDayBefore),
            title: "Contributions due tomorrow".into(),
            message: "1 due tomorrow".into(),
            group_id: None,
            related_user_id: None,
            sent_on: day,
        };
        ctx.repos.notifications.insert(&notification).await.unwrap();

        let sent = |kind, horizon, day| {
            let ctx = ctx.clone();
            let user_id = user_id.clone();
            async move { ctx.repos.notifications.was_sent(&user_id, kind, horizon, day).await }
        };

        assert!(
            sent(
                NotificationKind::ContributionReminder,
                ReminderHorizon::OneDayBefore,
                day
            )
            .await
        );
        // Another horizon of the same kind on the same day is distinct
        assert!(
            !sent(
                NotificationKind::ContributionReminder,
                ReminderHorizon::SameDay,
                day
            )
            .await
        );
        assert!(
            !sent(
                NotificationKind::OverdueEscalation,
                ReminderHorizon::OneDayBefore,
                day
            )
            .await
        );
        assert!(
            !sent(
                NotificationKind::ContributionReminder,
                ReminderHorizon::OneDayBefore,
                day.succ()
            )
            .await
        );
    }
}
