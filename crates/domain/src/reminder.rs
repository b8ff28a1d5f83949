use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// How far a deadline occurrence is from the reference day.
///
/// Only exact distances are horizons: a deadline 5 days out or 4 days
/// overdue matches nothing and produces no reminder. Reminders are
/// discrete checkpoints, not a continuous nag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderHorizon {
    SevenDaysBefore,
    OneDayBefore,
    SameDay,
    OneDayOverdue,
    ThreeDaysOverdue,
    SevenDaysOverdue,
    FourteenDaysOverdue,
}

pub const FORWARD_HORIZONS: [ReminderHorizon; 3] = [
    ReminderHorizon::SevenDaysBefore,
    ReminderHorizon::OneDayBefore,
    ReminderHorizon::SameDay,
];

pub const OVERDUE_HORIZONS: [ReminderHorizon; 4] = [
    ReminderHorizon::OneDayOverdue,
    ReminderHorizon::ThreeDaysOverdue,
    ReminderHorizon::SevenDaysOverdue,
    ReminderHorizon::FourteenDaysOverdue,
];

impl ReminderHorizon {
    /// The forward horizon matching an exact number of days until a
    /// deadline, if any
    pub fn from_days_until(days: i64) -> Option<Self> {
        match days {
            7 => Some(ReminderHorizon::SevenDaysBefore),
            1 => Some(ReminderHorizon::OneDayBefore),
            0 => Some(ReminderHorizon::SameDay),
            _ => None,
        }
    }

    /// The overdue horizon matching an exact number of days since a
    /// deadline, if any
    pub fn from_days_overdue(days: i64) -> Option<Self> {
        match days {
            1 => Some(ReminderHorizon::OneDayOverdue),
            3 => Some(ReminderHorizon::ThreeDaysOverdue),
            7 => Some(ReminderHorizon::SevenDaysOverdue),
            14 => Some(ReminderHorizon::FourteenDaysOverdue),
            _ => None,
        }
    }

    pub fn is_overdue(&self) -> bool {
        OVERDUE_HORIZONS.contains(self)
    }

    /// Human phrasing used in notification and email copy
    pub fn phrase(&self) -> &'static str {
        match self {
            ReminderHorizon::SevenDaysBefore => "in 7 days",
            ReminderHorizon::OneDayBefore => "tomorrow",
            ReminderHorizon::SameDay => "today",
            ReminderHorizon::OneDayOverdue => "1 day overdue",
            ReminderHorizon::ThreeDaysOverdue => "3 days overdue",
            ReminderHorizon::SevenDaysOverdue => "7 days overdue",
            ReminderHorizon::FourteenDaysOverdue => "14 days overdue",
        }
    }
}

impl Display for ReminderHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReminderHorizon::SevenDaysBefore => "seven_days_before",
            ReminderHorizon::OneDayBefore => "one_day_before",
            ReminderHorizon::SameDay => "same_day",
            ReminderHorizon::OneDayOverdue => "one_day_overdue",
            ReminderHorizon::ThreeDaysOverdue => "three_days_overdue",
            ReminderHorizon::SevenDaysOverdue => "seven_days_overdue",
            ReminderHorizon::FourteenDaysOverdue => "fourteen_days_overdue",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum InvalidReminderError {
    #[error("Reminder horizon: {0} is not valid")]
    UnknownHorizon(String),
    #[error("Notification kind: {0} is not valid")]
    UnknownKind(String),
}

impl FromStr for ReminderHorizon {
    type Err = InvalidReminderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seven_days_before" => Ok(ReminderHorizon::SevenDaysBefore),
            "one_day_before" => Ok(ReminderHorizon::OneDayBefore),
            "same_day" => Ok(ReminderHorizon::SameDay),
            "one_day_overdue" => Ok(ReminderHorizon::OneDayOverdue),
            "three_days_overdue" => Ok(ReminderHorizon::ThreeDaysOverdue),
            "seven_days_overdue" => Ok(ReminderHorizon::SevenDaysOverdue),
            "fourteen_days_overdue" => Ok(ReminderHorizon::FourteenDaysOverdue),
            _ => Err(InvalidReminderError::UnknownHorizon(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ContributionReminder,
    OverdueEscalation,
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationKind::ContributionReminder => "contribution_reminder",
            NotificationKind::OverdueEscalation => "overdue_escalation",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for NotificationKind {
    type Err = InvalidReminderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contribution_reminder" => Ok(NotificationKind::ContributionReminder),
            "overdue_escalation" => Ok(NotificationKind::OverdueEscalation),
            _ => Err(InvalidReminderError::UnknownKind(s.to_string())),
        }
    }
}

/// An in-app notification. The stored row doubles as the delivery
/// dedup marker: one (user, kind, horizon, sent_on) tuple suppresses
/// any further send for that horizon on that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: ID,
    pub user_id: ID,
    pub kind: NotificationKind,
    pub horizon: Option<ReminderHorizon>,
    pub title: String,
    pub message: String,
    pub group_id: Option<ID>,
    pub related_user_id: Option<ID>,
    /// Calendar day the notification was delivered on
    pub sent_on: NaiveDate,
}

impl Entity for Notification {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

/// One obligation line inside a consolidated reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestItem {
    pub group_id: ID,
    pub group_name: String,
    /// The celebrant for birthday obligations
    pub obligee_id: Option<ID>,
    pub obligee_name: Option<String>,
    pub occurrence: NaiveDate,
    pub amount_minor: i64,
    pub currency: String,
    /// Whether a payment attempt already exists for this obligation
    pub attempted: bool,
}

impl DigestItem {
    /// The name shown in copy: the celebrant for birthdays, otherwise
    /// the group itself
    pub fn display_name(&self) -> &str {
        self.obligee_name.as_deref().unwrap_or(&self.group_name)
    }
}

/// The consolidated payload for one (user, horizon) pair: a single
/// notification and a single email regardless of how many groups or
/// celebrants landed in the horizon. Batching here is what prevents
/// notification flooding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDigest {
    pub kind: NotificationKind,
    pub horizon: ReminderHorizon,
    /// Items in membership retrieval order
    pub items: Vec<DigestItem>,
}

impl ReminderDigest {
    pub fn unpaid_count(&self) -> usize {
        self.items.iter().filter(|i| !i.attempted).count()
    }

    pub fn paid_count(&self) -> usize {
        self.items.iter().filter(|i| i.attempted).count()
    }

    /// Outstanding amounts summed per currency, in first-seen order.
    ///
    /// Forward digests total only unattempted items, a payment attempt
    /// is enough to stop reminding. Overdue digests total every item:
    /// they only contain obligations that are still owed, and an
    /// attempted-but-owed item (unconfirmed or disputed) is exactly
    /// what escalation is about.
    pub fn unpaid_totals(&self) -> Vec<(String, i64)> {
        let owed = |item: &&DigestItem| match self.kind {
            NotificationKind::ContributionReminder => !item.attempted,
            NotificationKind::OverdueEscalation => true,
        };
        let mut totals: Vec<(String, i64)> = Vec::new();
        for item in self.items.iter().filter(owed) {
            match totals.iter_mut().find(|(c, _)| *c == item.currency) {
                Some((_, amount)) => *amount += item.amount_minor,
                None => totals.push((item.currency.clone(), item.amount_minor)),
            }
        }
        totals
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.display_name()).unique().collect()
    }

    pub fn title(&self) -> String {
        match self.kind {
            NotificationKind::ContributionReminder => {
                format!("Contributions due {}", self.horizon.phrase())
            }
            NotificationKind::OverdueEscalation => {
                format!("Contributions {}", self.horizon.phrase())
            }
        }
    }

    pub fn message(&self) -> String {
        let names = self.names().join(", ");
        let totals = self
            .unpaid_totals()
            .iter()
            .map(|(currency, amount)| format_amount(*amount, currency))
            .join(", ");
        match self.kind {
            NotificationKind::ContributionReminder => format!(
                "{} due {}: {}. {} unpaid, {} already paid. Unpaid total: {}",
                self.items.len(),
                self.horizon.phrase(),
                names,
                self.unpaid_count(),
                self.paid_count(),
                totals
            ),
            NotificationKind::OverdueEscalation => format!(
                "{} contributions are {}: {}. Outstanding total: {}",
                self.items.len(),
                self.horizon.phrase(),
                names,
                totals
            ),
        }
    }
}

pub fn format_amount(amount_minor: i64, currency: &str) -> String {
    format!("{}.{:02} {}", amount_minor / 100, amount_minor % 100, currency)
}

#[cfg(test)]
mod test {
    use super::*;

    fn digest_item(group_name: &str, obligee: Option<&str>, amount: i64, attempted: bool) -> DigestItem {
        DigestItem {
            group_id: Default::default(),
            group_name: group_name.into(),
            obligee_id: obligee.map(|_| Default::default()),
            obligee_name: obligee.map(|n| n.into()),
            occurrence: NaiveDate::from_ymd(2024, 6, 15),
            amount_minor: amount,
            currency: "EUR".into(),
            attempted,
        }
    }

    #[test]
    fn only_exact_day_distances_match_horizons() {
        assert_eq!(
            ReminderHorizon::from_days_until(7),
            Some(ReminderHorizon::SevenDaysBefore)
        );
        assert_eq!(
            ReminderHorizon::from_days_until(1),
            Some(ReminderHorizon::OneDayBefore)
        );
        assert_eq!(
            ReminderHorizon::from_days_until(0),
            Some(ReminderHorizon::SameDay)
        );
        assert_eq!(ReminderHorizon::from_days_until(5), None);
        assert_eq!(ReminderHorizon::from_days_until(2), None);

        assert_eq!(
            ReminderHorizon::from_days_overdue(1),
            Some(ReminderHorizon::OneDayOverdue)
        );
        assert_eq!(
            ReminderHorizon::from_days_overdue(14),
            Some(ReminderHorizon::FourteenDaysOverdue)
        );
        // A day in between is an explicit boundary policy, not a bug
        assert_eq!(ReminderHorizon::from_days_overdue(4), None);
        assert_eq!(ReminderHorizon::from_days_overdue(0), None);
        assert_eq!(ReminderHorizon::from_days_overdue(15), None);
    }

    #[test]
    fn digest_consolidates_counts_and_totals() {
        let digest = ReminderDigest {
            kind: NotificationKind::ContributionReminder,
            horizon: ReminderHorizon::OneDayBefore,
            items: vec![
                digest_item("Friends", Some("Alice"), 2500, false),
                digest_item("Streaming", None, 500, true),
                digest_item("Road trip", None, 10000, false),
            ],
        };
        assert_eq!(digest.unpaid_count(), 2);
        assert_eq!(digest.paid_count(), 1);
        assert_eq!(digest.unpaid_totals(), vec![("EUR".into(), 12500)]);
        assert_eq!(digest.names(), vec!["Alice", "Streaming", "Road trip"]);

        let message = digest.message();
        assert!(message.contains("tomorrow"));
        assert!(message.contains("Alice"));
        assert!(message.contains("125.00 EUR"));
    }

    #[test]
    fn overdue_totals_include_attempted_items() {
        // Disputed and unconfirmed payments are attempted yet still
        // owed, an overdue digest must not total them away
        let digest = ReminderDigest {
            kind: NotificationKind::OverdueEscalation,
            horizon: ReminderHorizon::OneDayOverdue,
            items: vec![digest_item("Road trip", None, 10000, true)],
        };
        assert_eq!(digest.unpaid_totals(), vec![("EUR".into(), 10000)]);
        assert!(digest.message().contains("100.00 EUR"));
    }

    #[test]
    fn digest_totals_are_split_per_currency() {
        let mut item_usd = digest_item("Road trip", None, 10000, false);
        item_usd.currency = "USD".into();
        let digest = ReminderDigest {
            kind: NotificationKind::OverdueEscalation,
            horizon: ReminderHorizon::ThreeDaysOverdue,
            items: vec![digest_item("Friends", Some("Alice"), 2500, false), item_usd],
        };
        assert_eq!(
            digest.unpaid_totals(),
            vec![("EUR".into(), 2500), ("USD".into(), 10000)]
        );
    }

    #[test]
    fn it_formats_amounts_in_minor_units() {
        assert_eq!(format_amount(2500, "EUR"), "25.00 EUR");
        assert_eq!(format_amount(105, "USD"), "1.05 USD");
    }
}
