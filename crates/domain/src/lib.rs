mod contribution;
mod date;
mod deadline;
mod group;
mod reminder;
mod shared;
mod user;

pub use contribution::{
    resolve_standing, Contribution, ContributionStatus, InvalidContributionError, Obligation,
    ObligationStanding, PeriodKey,
};
pub use date::{clamped_date, clamped_day, days_between, get_month_length, is_leap_year};
pub use deadline::{DeadlineRule, InvalidDeadlineRule};
pub use group::{BillingCycle, Group, GroupKind, GroupMembership, GroupStatus};
pub use reminder::{
    format_amount, DigestItem, Notification, NotificationKind, ReminderDigest, ReminderHorizon,
    FORWARD_HORIZONS, OVERDUE_HORIZONS,
};
pub use shared::entity::{Entity, ID};
pub use user::{NotificationPreferences, User};
