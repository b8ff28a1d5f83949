use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Payment-intent state for one obligation.
///
/// `NotPaid -> Paid -> Confirmed`, with a side path `Paid -> NotReceived`
/// when the celebrant disputes receipt. A disputed contribution must be
/// re-paid, so `NotReceived` only transitions back to `Paid`, never to
/// `NotPaid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionStatus {
    NotPaid,
    Paid,
    Confirmed,
    NotReceived,
}

impl ContributionStatus {
    pub fn can_transition(self, next: Self) -> bool {
        use ContributionStatus::*;
        matches!(
            (self, next),
            (NotPaid, Paid) | (Paid, Confirmed) | (Paid, NotReceived) | (NotReceived, Paid)
        )
    }

    /// Whether a payment attempt has been made. Forward reminders are
    /// suppressed once any attempt exists, even an unconfirmed or
    /// disputed one.
    pub fn has_attempted(self) -> bool {
        !matches!(self, ContributionStatus::NotPaid)
    }
}

impl Display for ContributionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContributionStatus::NotPaid => "not_paid",
            ContributionStatus::Paid => "paid",
            ContributionStatus::Confirmed => "confirmed",
            ContributionStatus::NotReceived => "not_received",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum InvalidContributionError {
    #[error("Contribution status: {0} is not valid")]
    UnknownStatus(String),
    #[error("Contribution status cannot go from {from} to {to}")]
    IllegalTransition {
        from: ContributionStatus,
        to: ContributionStatus,
    },
    #[error("Period key: {0} is malformed")]
    MalformedPeriodKey(String),
}

impl FromStr for ContributionStatus {
    type Err = InvalidContributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_paid" => Ok(ContributionStatus::NotPaid),
            "paid" => Ok(ContributionStatus::Paid),
            "confirmed" => Ok(ContributionStatus::Confirmed),
            "not_received" => Ok(ContributionStatus::NotReceived),
            _ => Err(InvalidContributionError::UnknownStatus(s.to_string())),
        }
    }
}

/// Identifies the recurrence period a contribution belongs to. There is
/// at most one contribution per (group, obligee, contributor, period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKey {
    /// Birthdays are keyed by occurrence year
    Year(i32),
    /// Subscriptions are keyed by the start of the billing period
    PeriodStart(NaiveDate),
    /// General groups have a single deadline
    Single,
}

impl Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodKey::Year(year) => write!(f, "year:{}", year),
            PeriodKey::PeriodStart(date) => write!(f, "period:{}", date.format("%Y-%m-%d")),
            PeriodKey::Single => write!(f, "single"),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = InvalidContributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidContributionError::MalformedPeriodKey(s.to_string());
        if s == "single" {
            return Ok(PeriodKey::Single);
        }
        if let Some(year) = s.strip_prefix("year:") {
            return year.parse().map(PeriodKey::Year).map_err(|_| malformed());
        }
        if let Some(date) = s.strip_prefix("period:") {
            return NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(PeriodKey::PeriodStart)
                .map_err(|_| malformed());
        }
        Err(malformed())
    }
}

/// A persisted payment intent from one contributor towards one group
/// deadline occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: ID,
    pub group_id: ID,
    pub contributor_id: ID,
    /// The celebrant for birthday groups, `None` for group-level
    /// subscription and general deadlines
    pub obligee_id: Option<ID>,
    pub period: PeriodKey,
    pub amount_minor: i64,
    pub currency: String,
    pub status: ContributionStatus,
}

impl Contribution {
    pub fn new(
        group_id: ID,
        contributor_id: ID,
        obligee_id: Option<ID>,
        period: PeriodKey,
        amount_minor: i64,
        currency: String,
    ) -> Self {
        Self {
            id: Default::default(),
            group_id,
            contributor_id,
            obligee_id,
            period,
            amount_minor,
            currency,
            status: ContributionStatus::NotPaid,
        }
    }

    pub fn transition(&mut self, next: ContributionStatus) -> Result<(), InvalidContributionError> {
        if !self.status.can_transition(next) {
            return Err(InvalidContributionError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

impl Entity for Contribution {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

/// An expectation that a contributor owes a group deadline occurrence
/// a contribution. Not stored, computed from group membership and the
/// group's deadline rule and then resolved against the contribution
/// record for the same period.
#[derive(Debug, Clone)]
pub struct Obligation {
    pub group_id: ID,
    pub contributor_id: ID,
    pub obligee_id: Option<ID>,
    pub occurrence: NaiveDate,
    pub period: PeriodKey,
    pub amount_minor: i64,
    pub currency: String,
}

/// How one obligation stands against its contribution record.
///
/// `has_attempted` and `still_owed` are deliberately separate
/// predicates: reminders stop once any payment attempt exists, while
/// overdue escalation keeps firing until money has actually changed
/// hands. Do not collapse them into one "is done" flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObligationStanding {
    pub status: Option<ContributionStatus>,
    pub has_attempted: bool,
    pub still_owed: bool,
}

pub fn resolve_standing(
    record: Option<&Contribution>,
    occurrence_passed: bool,
) -> ObligationStanding {
    let status = record.map(|record| record.status);
    let has_attempted = status.map(|s| s.has_attempted()).unwrap_or(false);
    let still_owed = match status {
        None => true,
        Some(ContributionStatus::NotPaid) => true,
        // A dispute means money has not actually changed hands
        Some(ContributionStatus::NotReceived) => true,
        // Paid but unconfirmed after the deadline is still escalation-worthy
        Some(ContributionStatus::Paid) => occurrence_passed,
        Some(ContributionStatus::Confirmed) => false,
    };
    ObligationStanding {
        status,
        has_attempted,
        still_owed,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn contribution_with_status(status: ContributionStatus) -> Contribution {
        let mut contribution = Contribution::new(
            Default::default(),
            Default::default(),
            None,
            PeriodKey::Year(2024),
            2500,
            "EUR".into(),
        );
        contribution.status = status;
        contribution
    }

    #[test]
    fn status_follows_the_state_machine() {
        let mut contribution = contribution_with_status(ContributionStatus::NotPaid);
        assert!(contribution.transition(ContributionStatus::Confirmed).is_err());
        assert!(contribution.transition(ContributionStatus::Paid).is_ok());
        assert!(contribution.transition(ContributionStatus::NotReceived).is_ok());
        // A disputed contribution must be re-paid, not reset
        assert!(contribution.transition(ContributionStatus::NotPaid).is_err());
        assert!(contribution.transition(ContributionStatus::Paid).is_ok());
        assert!(contribution.transition(ContributionStatus::Confirmed).is_ok());
        assert!(contribution.transition(ContributionStatus::Paid).is_err());
    }

    #[test]
    fn any_status_but_not_paid_counts_as_attempted() {
        assert!(!ContributionStatus::NotPaid.has_attempted());
        assert!(ContributionStatus::Paid.has_attempted());
        assert!(ContributionStatus::Confirmed.has_attempted());
        assert!(ContributionStatus::NotReceived.has_attempted());
    }

    #[test]
    fn missing_record_is_owed_and_unattempted() {
        let standing = resolve_standing(None, false);
        assert!(!standing.has_attempted);
        assert!(standing.still_owed);
    }

    #[test]
    fn confirmed_is_never_owed() {
        let record = contribution_with_status(ContributionStatus::Confirmed);
        assert!(!resolve_standing(Some(&record), true).still_owed);
        assert!(!resolve_standing(Some(&record), false).still_owed);
    }

    #[test]
    fn not_received_is_attempted_but_still_owed() {
        let record = contribution_with_status(ContributionStatus::NotReceived);
        let standing = resolve_standing(Some(&record), true);
        assert!(standing.has_attempted);
        assert!(standing.still_owed);
    }

    #[test]
    fn paid_is_only_owed_after_the_occurrence() {
        let record = contribution_with_status(ContributionStatus::Paid);
        assert!(!resolve_standing(Some(&record), false).still_owed);
        assert!(resolve_standing(Some(&record), true).still_owed);
    }

    #[test]
    fn period_keys_round_trip_through_strings() {
        let keys = vec![
            PeriodKey::Year(2024),
            PeriodKey::PeriodStart(NaiveDate::from_ymd(2024, 6, 1)),
            PeriodKey::Single,
        ];
        for key in keys {
            assert_eq!(key.to_string().parse::<PeriodKey>().unwrap(), key);
        }
        assert!("year:".parse::<PeriodKey>().is_err());
        assert!("period:2024-13-01".parse::<PeriodKey>().is_err());
        assert!("weekly:1".parse::<PeriodKey>().is_err());
    }
}
