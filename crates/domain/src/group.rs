use crate::deadline::DeadlineRule;
use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cycle", rename_all = "camelCase")]
pub enum BillingCycle {
    Monthly { day_of_month: u32 },
    Annual { month: u32, day_of_month: u32 },
}

/// What kind of deadlines a group tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GroupKind {
    /// Members contribute towards each other's birthdays. Deadlines are
    /// derived per member from their birthday, not from the group.
    Birthday,
    /// Members share a recurring subscription cost
    Subscription { billing: BillingCycle },
    /// A single fixed deadline the group collects towards
    General { deadline: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: ID,
    pub name: String,
    pub kind: GroupKind,
    /// Expected contribution per member in minor currency units
    pub amount_minor: i64,
    pub currency: String,
    pub status: GroupStatus,
}

impl Group {
    pub fn new(name: String, kind: GroupKind, amount_minor: i64, currency: String) -> Self {
        Self {
            id: Default::default(),
            name,
            kind,
            amount_minor,
            currency,
            status: GroupStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GroupStatus::Active
    }

    /// The group-level deadline rule. Birthday groups have none as
    /// their deadlines come from member birthdays.
    pub fn deadline_rule(&self) -> Option<DeadlineRule> {
        match self.kind {
            GroupKind::Birthday => None,
            GroupKind::Subscription { billing } => Some(match billing {
                BillingCycle::Monthly { day_of_month } => {
                    DeadlineRule::SubscriptionMonthly { day_of_month }
                }
                BillingCycle::Annual {
                    month,
                    day_of_month,
                } => DeadlineRule::SubscriptionAnnual {
                    month,
                    day_of_month,
                },
            }),
            GroupKind::General { deadline } => Some(DeadlineRule::GeneralFixed { date: deadline }),
        }
    }
}

impl Entity for Group {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

/// A user's membership in a group. The join date guards liability:
/// occurrences before `joined_at` never produce obligations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub id: ID,
    pub group_id: ID,
    pub user_id: ID,
    pub joined_at: NaiveDate,
}

impl GroupMembership {
    pub fn new(group_id: ID, user_id: ID, joined_at: NaiveDate) -> Self {
        Self {
            id: Default::default(),
            group_id,
            user_id,
            joined_at,
        }
    }
}

impl Entity for GroupMembership {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
