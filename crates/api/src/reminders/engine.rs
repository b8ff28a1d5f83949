use chrono::{Datelike, NaiveDate};
use pitchin_domain::{
    days_between, resolve_standing, DeadlineRule, DigestItem, Group, GroupKind, GroupMembership,
    Notification, NotificationKind, Obligation, ReminderDigest, ReminderHorizon, User, ID,
    FORWARD_HORIZONS, OVERDUE_HORIZONS,
};
use pitchin_infra::PitchinContext;
use std::collections::HashMap;
use tracing::{error, warn};

/// The one parameterized engine behind both reminder runs: the forward
/// run looks at upcoming deadlines, the overdue run at deadlines that
/// have passed. Everything else, traversal, bucketing, dedup and
/// dispatch, is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Forward,
    Overdue,
}

impl RunKind {
    pub fn horizons(&self) -> &'static [ReminderHorizon] {
        match self {
            RunKind::Forward => &FORWARD_HORIZONS,
            RunKind::Overdue => &OVERDUE_HORIZONS,
        }
    }

    pub fn notification_kind(&self) -> NotificationKind {
        match self {
            RunKind::Forward => NotificationKind::ContributionReminder,
            RunKind::Overdue => NotificationKind::OverdueEscalation,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub users_processed: usize,
    pub notifications_sent: usize,
    pub emails_sent: usize,
    pub duplicates_skipped: usize,
    pub errors: usize,
}

impl RunSummary {
    fn absorb(&mut self, other: RunSummary) {
        self.notifications_sent += other.notifications_sent;
        self.emails_sent += other.emails_sent;
        self.duplicates_skipped += other.duplicates_skipped;
        self.errors += other.errors;
    }
}

/// Visits every verified, active user with at least one membership and
/// delivers at most one notification and one email per non-empty,
/// non-duplicate, preference-enabled horizon bucket. Re-running on the
/// same day is safe, the dedup gate suppresses everything already
/// delivered.
pub async fn run(ctx: &PitchinContext, as_of: Option<NaiveDate>, kind: RunKind) -> RunSummary {
    let as_of = as_of.unwrap_or_else(|| ctx.sys.get_date_today());
    let mut summary = RunSummary::default();

    let recipients = ctx.repos.users.find_reminder_recipients().await;
    for user in &recipients {
        let memberships = ctx.repos.memberships.find_by_user(&user.id).await;
        if memberships.is_empty() {
            continue;
        }
        summary.users_processed += 1;
        // One user failing must never abort the others
        let user_summary = run_for_user(ctx, user, &memberships, as_of, kind).await;
        summary.absorb(user_summary);
    }

    summary
}

async fn run_for_user(
    ctx: &PitchinContext,
    user: &User,
    memberships: &[GroupMembership],
    as_of: NaiveDate,
    kind: RunKind,
) -> RunSummary {
    let mut summary = RunSummary::default();

    // Aggregation completes fully before any dedup check or dispatch,
    // a strict read-then-decide-then-write ordering per bucket.
    let mut groups_with_items: Vec<Vec<(ReminderHorizon, DigestItem)>> = Vec::new();
    for membership in memberships {
        let group = match ctx.repos.groups.find(&membership.group_id).await {
            Some(group) => group,
            None => {
                warn!(
                    "Membership: {} for user: {} references missing group: {}",
                    membership.id, user.id, membership.group_id
                );
                summary.errors += 1;
                continue;
            }
        };
        if !group.is_active() {
            continue;
        }
        match collect_group_obligations(ctx, &group, membership, user, as_of, kind).await {
            Ok(items) if !items.is_empty() => groups_with_items.push(items),
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Skipping group: {} for user: {}. Error: {:?}",
                    group.id, user.id, e
                );
                summary.errors += 1;
            }
        }
    }

    for horizon in kind.horizons() {
        if !preference_allows(user, kind, *horizon) {
            continue;
        }
        let items = bucket_items(&groups_with_items, *horizon, kind);
        if items.is_empty() {
            continue;
        }

        let notification_kind = kind.notification_kind();
        if ctx
            .repos
            .notifications
            .was_sent(&user.id, notification_kind, *horizon, as_of)
            .await
        {
            summary.duplicates_skipped += 1;
            continue;
        }

        let digest = ReminderDigest {
            kind: notification_kind,
            horizon: *horizon,
            items,
        };

        // The notification row is the dedup marker, so it is written as
        // part of the in-app delivery itself. The email goes out after,
        // a failed email is logged and picked up by observing the error
        // count, never retried within the run.
        let notification = compose_notification(user, &digest, as_of);
        match ctx.repos.notifications.insert(&notification).await {
            Ok(_) => summary.notifications_sent += 1,
            Err(e) => {
                error!(
                    "Unable to insert notification for user: {}. Error: {:?}",
                    user.id, e
                );
                summary.errors += 1;
                continue;
            }
        }

        let email_res = match kind {
            RunKind::Forward => ctx.mailer.send_reminder(&user.email, &digest).await,
            RunKind::Overdue => ctx.mailer.send_overdue(&user.email, &digest).await,
        };
        match email_res {
            Ok(_) => summary.emails_sent += 1,
            Err(e) => {
                error!("Unable to email user: {}. Error: {:?}", user.id, e);
                summary.errors += 1;
            }
        }
    }

    summary
}

/// The 7-day, 1-day and same-day flags gate their own forward buckets.
/// Overdue escalation as a whole is gated by the same-day flag alone,
/// there is no separate overdue preference.
fn preference_allows(user: &User, kind: RunKind, horizon: ReminderHorizon) -> bool {
    let prefs = &user.preferences;
    match kind {
        RunKind::Forward => match horizon {
            ReminderHorizon::SevenDaysBefore => prefs.seven_days_before,
            ReminderHorizon::OneDayBefore => prefs.one_day_before,
            ReminderHorizon::SameDay => prefs.same_day,
            _ => false,
        },
        RunKind::Overdue => prefs.same_day,
    }
}

/// A group contributes to a forward bucket only if at least one of its
/// obligations is unattempted, but then all of them are shown so the
/// digest can report paid and unpaid counts. Overdue items were already
/// filtered down to still-owed ones during collection.
fn bucket_items(
    groups_with_items: &[Vec<(ReminderHorizon, DigestItem)>],
    horizon: ReminderHorizon,
    kind: RunKind,
) -> Vec<DigestItem> {
    let mut bucket = Vec::new();
    for group_items in groups_with_items {
        let matching: Vec<&DigestItem> = group_items
            .iter()
            .filter(|(h, _)| *h == horizon)
            .map(|(_, item)| item)
            .collect();
        let include = match kind {
            RunKind::Forward => matching.iter().any(|item| !item.attempted),
            RunKind::Overdue => !matching.is_empty(),
        };
        if include {
            bucket.extend(matching.into_iter().cloned());
        }
    }
    bucket
}

async fn collect_group_obligations(
    ctx: &PitchinContext,
    group: &Group,
    membership: &GroupMembership,
    contributor: &User,
    as_of: NaiveDate,
    kind: RunKind,
) -> anyhow::Result<Vec<(ReminderHorizon, DigestItem)>> {
    let mut items = Vec::new();

    match group.kind {
        GroupKind::Birthday => {
            let members = ctx.repos.memberships.find_by_group(&group.id).await;
            let other_ids: Vec<ID> = members
                .iter()
                .filter(|m| m.user_id != contributor.id)
                .map(|m| m.user_id.clone())
                .collect();
            let others: HashMap<ID, User> = ctx
                .repos
                .users
                .find_many(&other_ids)
                .await
                .into_iter()
                .map(|user| (user.id.clone(), user))
                .collect();

            // Iterate memberships rather than the lookup to keep the
            // output order deterministic
            for member in members.iter().filter(|m| m.user_id != contributor.id) {
                let celebrant = match others.get(&member.user_id) {
                    Some(celebrant) => celebrant,
                    None => continue,
                };
                let birthday = match celebrant.birthday {
                    Some(birthday) => birthday,
                    None => continue,
                };
                let rule = DeadlineRule::Birthday {
                    month: birthday.month(),
                    day: birthday.day(),
                };
                if let Some(item) = resolve_item(
                    ctx,
                    group,
                    membership,
                    contributor,
                    &rule,
                    Some(celebrant),
                    as_of,
                    kind,
                )
                .await
                {
                    items.push(item);
                }
            }
        }
        GroupKind::Subscription { .. } | GroupKind::General { .. } => {
            // Present for both kinds by construction
            let rule = match group.deadline_rule() {
                Some(rule) => rule,
                None => return Ok(items),
            };
            rule.validate()?;
            if let Some(item) =
                resolve_item(ctx, group, membership, contributor, &rule, None, as_of, kind).await
            {
                items.push(item);
            }
        }
    }

    Ok(items)
}

/// Computes the obligation one deadline rule produces for this
/// contributor, if its occurrence lands exactly on a horizon and the
/// obligation is relevant for the run kind.
async fn resolve_item(
    ctx: &PitchinContext,
    group: &Group,
    membership: &GroupMembership,
    contributor: &User,
    rule: &DeadlineRule,
    obligee: Option<&User>,
    as_of: NaiveDate,
    kind: RunKind,
) -> Option<(ReminderHorizon, DigestItem)> {
    let (horizon, occurrence) = match kind {
        RunKind::Forward => {
            let occurrence = rule.next_occurrence(as_of);
            let horizon = ReminderHorizon::from_days_until(days_between(as_of, occurrence))?;
            (horizon, occurrence)
        }
        RunKind::Overdue => {
            let occurrence = rule.most_recent_occurrence(as_of);
            let horizon = ReminderHorizon::from_days_overdue(days_between(occurrence, as_of))?;
            (horizon, occurrence)
        }
    };

    // Obligations predating the contributor's membership never appear
    if membership.joined_at > occurrence {
        return None;
    }

    let obligation = Obligation {
        group_id: group.id.clone(),
        contributor_id: contributor.id.clone(),
        obligee_id: obligee.map(|o| o.id.clone()),
        occurrence,
        period: rule.period_key(occurrence),
        amount_minor: group.amount_minor,
        currency: group.currency.clone(),
    };

    let record = ctx
        .repos
        .contributions
        .find_for_obligation(
            &obligation.group_id,
            obligation.obligee_id.as_ref(),
            &obligation.contributor_id,
            &obligation.period,
        )
        .await;
    let standing = resolve_standing(record.as_ref(), occurrence < as_of);

    if kind == RunKind::Overdue && !standing.still_owed {
        return None;
    }

    Some((
        horizon,
        DigestItem {
            group_id: obligation.group_id,
            group_name: group.name.clone(),
            obligee_id: obligation.obligee_id,
            obligee_name: obligee.map(|o| o.full_name.clone()),
            occurrence,
            amount_minor: obligation.amount_minor,
            currency: obligation.currency,
            attempted: standing.has_attempted,
        },
    ))
}

fn compose_notification(user: &User, digest: &ReminderDigest, as_of: NaiveDate) -> Notification {
    // Only point at a group and celebrant when the digest is about a
    // single obligation, a consolidated digest spans several
    let (group_id, related_user_id) = match digest.items.as_slice() {
        [item] => (Some(item.group_id.clone()), item.obligee_id.clone()),
        _ => (None, None),
    };
    Notification {
        id: Default::default(),
        user_id: user.id.clone(),
        kind: digest.kind,
        horizon: Some(digest.horizon),
        title: digest.title(),
        message: digest.message(),
        group_id,
        related_user_id,
        sent_on: as_of,
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use chrono::NaiveDate;
    use pitchin_domain::{Group, GroupKind, GroupMembership, User};
    use pitchin_infra::{
        setup_context_inmemory, ISys, InMemoryMailerService, PitchinContext,
    };
    use std::sync::Arc;

    pub struct StaticSys(pub NaiveDate);

    impl ISys for StaticSys {
        fn get_timestamp_millis(&self) -> i64 {
            self.0.and_hms(12, 0, 0).timestamp_millis()
        }
    }

    pub struct TestApp {
        pub ctx: PitchinContext,
        pub mailer: Arc<InMemoryMailerService>,
    }

    pub fn setup(today: NaiveDate) -> TestApp {
        let mut ctx = setup_context_inmemory();
        ctx.sys = Arc::new(StaticSys(today));
        let mailer = Arc::new(InMemoryMailerService::new());
        ctx.mailer = mailer.clone();
        TestApp { ctx, mailer }
    }

    pub async fn insert_recipient(
        ctx: &PitchinContext,
        name: &str,
        birthday: Option<NaiveDate>,
    ) -> User {
        let mut user = User::new(format!("{}@pitchin.test", name.to_lowercase()), name.into());
        user.verified = true;
        user.birthday = birthday;
        ctx.repos.users.insert(&user).await.unwrap();
        user
    }

    pub async fn insert_group(
        ctx: &PitchinContext,
        name: &str,
        kind: GroupKind,
        amount_minor: i64,
    ) -> Group {
        let group = Group::new(name.into(), kind, amount_minor, "EUR".into());
        ctx.repos.groups.insert(&group).await.unwrap();
        group
    }

    pub async fn join(ctx: &PitchinContext, group: &Group, user: &User, joined_at: NaiveDate) {
        let membership = GroupMembership::new(group.id.clone(), user.id.clone(), joined_at);
        ctx.repos.memberships.insert(&membership).await.unwrap();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pitchin_domain::NotificationPreferences;

    fn item(group_name: &str, attempted: bool) -> DigestItem {
        DigestItem {
            group_id: Default::default(),
            group_name: group_name.into(),
            obligee_id: None,
            obligee_name: None,
            occurrence: NaiveDate::from_ymd(2024, 6, 15),
            amount_minor: 2500,
            currency: "EUR".into(),
            attempted,
        }
    }

    #[test]
    fn forward_bucket_needs_an_unattempted_item_per_group() {
        let fully_paid = vec![(ReminderHorizon::SameDay, item("Streaming", true))];
        let partially_paid = vec![
            (ReminderHorizon::SameDay, item("Friends", false)),
            (ReminderHorizon::SameDay, item("Friends", true)),
        ];
        let groups = vec![fully_paid, partially_paid];

        let bucket = bucket_items(&groups, ReminderHorizon::SameDay, RunKind::Forward);
        // The fully paid group is dropped, the partially paid one is
        // shown in full so paid counts stay truthful
        assert_eq!(bucket.len(), 2);
        assert!(bucket.iter().all(|i| i.group_name == "Friends"));

        let bucket = bucket_items(&groups, ReminderHorizon::OneDayBefore, RunKind::Forward);
        assert!(bucket.is_empty());
    }

    #[test]
    fn overdue_bucket_keeps_every_matching_item() {
        let groups = vec![
            vec![(ReminderHorizon::ThreeDaysOverdue, item("Streaming", true))],
            vec![(ReminderHorizon::OneDayOverdue, item("Friends", false))],
        ];
        let bucket = bucket_items(&groups, ReminderHorizon::ThreeDaysOverdue, RunKind::Overdue);
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].group_name, "Streaming");
    }

    #[test]
    fn same_day_flag_gates_every_overdue_horizon() {
        let mut user = User::new("a@pitchin.test".into(), "A".into());
        user.preferences = NotificationPreferences {
            seven_days_before: true,
            one_day_before: true,
            same_day: false,
        };
        for horizon in RunKind::Overdue.horizons() {
            assert!(!preference_allows(&user, RunKind::Overdue, *horizon));
        }
        assert!(preference_allows(
            &user,
            RunKind::Forward,
            ReminderHorizon::SevenDaysBefore
        ));
        assert!(!preference_allows(&user, RunKind::Forward, ReminderHorizon::SameDay));
    }

    #[test]
    fn notification_links_group_only_for_single_item_digests() {
        let user = User::new("a@pitchin.test".into(), "A".into());
        let single = ReminderDigest {
            kind: NotificationKind::ContributionReminder,
            horizon: ReminderHorizon::SameDay,
            items: vec![item("Friends", false)],
        };
        let as_of = NaiveDate::from_ymd(2024, 6, 15);
        let notification = compose_notification(&user, &single, as_of);
        assert_eq!(notification.group_id, Some(single.items[0].group_id.clone()));
        assert_eq!(notification.sent_on, as_of);

        let consolidated = ReminderDigest {
            kind: NotificationKind::ContributionReminder,
            horizon: ReminderHorizon::SameDay,
            items: vec![item("Friends", false), item("Streaming", false)],
        };
        let notification = compose_notification(&user, &consolidated, as_of);
        assert_eq!(notification.group_id, None);
        assert_eq!(notification.related_user_id, None);
    }
}
