use crate::contribution::PeriodKey;
use crate::date::clamped_date;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A recurrence rule describing when a group deadline falls.
///
/// Every rule resolves, for any reference date, to exactly one next
/// occurrence and exactly one most recent occurrence. Days of month
/// that do not exist in a given month are clamped to the last day of
/// that month, e.g. a rule for the 30th resolves to Feb 28 (Feb 29 in
/// leap years).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "camelCase")]
pub enum DeadlineRule {
    /// Recurs annually on a fixed month and day
    Birthday { month: u32, day: u32 },
    /// Recurs on the Nth day of every month
    SubscriptionMonthly { day_of_month: u32 },
    /// Recurs yearly on a fixed month and day
    SubscriptionAnnual { month: u32, day_of_month: u32 },
    /// A single absolute date, non-recurring
    GeneralFixed { date: NaiveDate },
}

#[derive(Error, Debug)]
pub enum InvalidDeadlineRule {
    #[error("Month: {0} is not a valid month")]
    InvalidMonth(u32),
    #[error("Day of month: {0} is not a valid day of month")]
    InvalidDayOfMonth(u32),
}

impl DeadlineRule {
    /// Checks that month and day fields describe a possible calendar
    /// date. Days 29-31 are allowed for any month as they are clamped
    /// when resolving occurrences.
    pub fn validate(&self) -> Result<(), InvalidDeadlineRule> {
        let (month, day) = match *self {
            DeadlineRule::Birthday { month, day } => (Some(month), day),
            DeadlineRule::SubscriptionMonthly { day_of_month } => (None, day_of_month),
            DeadlineRule::SubscriptionAnnual {
                month,
                day_of_month,
            } => (Some(month), day_of_month),
            DeadlineRule::GeneralFixed { .. } => return Ok(()),
        };
        if let Some(month) = month {
            if !(1..=12).contains(&month) {
                return Err(InvalidDeadlineRule::InvalidMonth(month));
            }
        }
        if !(1..=31).contains(&day) {
            return Err(InvalidDeadlineRule::InvalidDayOfMonth(day));
        }
        Ok(())
    }

    /// The first occurrence on or after `reference`
    pub fn next_occurrence(&self, reference: NaiveDate) -> NaiveDate {
        match *self {
            DeadlineRule::Birthday { month, day }
            | DeadlineRule::SubscriptionAnnual {
                month,
                day_of_month: day,
            } => {
                let candidate = clamped_date(reference.year(), month, day);
                if candidate < reference {
                    clamped_date(reference.year() + 1, month, day)
                } else {
                    candidate
                }
            }
            DeadlineRule::SubscriptionMonthly { day_of_month } => {
                let candidate = clamped_date(reference.year(), reference.month(), day_of_month);
                if candidate < reference {
                    let (year, month) = if reference.month() == 12 {
                        (reference.year() + 1, 1)
                    } else {
                        (reference.year(), reference.month() + 1)
                    };
                    clamped_date(year, month, day_of_month)
                } else {
                    candidate
                }
            }
            DeadlineRule::GeneralFixed { date } => date,
        }
    }

    /// The last occurrence on or before `reference`
    pub fn most_recent_occurrence(&self, reference: NaiveDate) -> NaiveDate {
        match *self {
            DeadlineRule::Birthday { month, day }
            | DeadlineRule::SubscriptionAnnual {
                month,
                day_of_month: day,
            } => {
                let candidate = clamped_date(reference.year(), month, day);
                if candidate > reference {
                    clamped_date(reference.year() - 1, month, day)
                } else {
                    candidate
                }
            }
            DeadlineRule::SubscriptionMonthly { day_of_month } => {
                let candidate = clamped_date(reference.year(), reference.month(), day_of_month);
                if candidate > reference {
                    let (year, month) = if reference.month() == 1 {
                        (reference.year() - 1, 12)
                    } else {
                        (reference.year(), reference.month() - 1)
                    };
                    clamped_date(year, month, day_of_month)
                } else {
                    candidate
                }
            }
            DeadlineRule::GeneralFixed { date } => date,
        }
    }

    /// The key under which a contribution for the given occurrence is
    /// stored: birthdays recur per year, subscriptions per period start
    /// and a fixed deadline has a single period.
    pub fn period_key(&self, occurrence: NaiveDate) -> PeriodKey {
        match self {
            DeadlineRule::Birthday { .. } => PeriodKey::Year(occurrence.year()),
            DeadlineRule::SubscriptionMonthly { .. }
            | DeadlineRule::SubscriptionAnnual { .. } => PeriodKey::PeriodStart(occurrence),
            DeadlineRule::GeneralFixed { .. } => PeriodKey::Single,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd(year, month, day)
    }

    #[test]
    fn birthday_next_occurrence_in_same_year() {
        let rule = DeadlineRule::Birthday { month: 6, day: 15 };
        assert_eq!(rule.next_occurrence(date(2024, 6, 10)), date(2024, 6, 15));
        // On the day itself
        assert_eq!(rule.next_occurrence(date(2024, 6, 15)), date(2024, 6, 15));
    }

    #[test]
    fn birthday_next_occurrence_rolls_over_to_next_year() {
        let rule = DeadlineRule::Birthday { month: 6, day: 15 };
        assert_eq!(rule.next_occurrence(date(2024, 6, 16)), date(2025, 6, 15));
    }

    #[test]
    fn birthday_most_recent_occurrence() {
        let rule = DeadlineRule::Birthday { month: 6, day: 15 };
        assert_eq!(
            rule.most_recent_occurrence(date(2024, 6, 16)),
            date(2024, 6, 15)
        );
        assert_eq!(
            rule.most_recent_occurrence(date(2024, 6, 15)),
            date(2024, 6, 15)
        );
        assert_eq!(
            rule.most_recent_occurrence(date(2024, 6, 10)),
            date(2023, 6, 15)
        );
    }

    #[test]
    fn feb_29_birthday_clamps_in_common_years() {
        let rule = DeadlineRule::Birthday { month: 2, day: 29 };
        assert_eq!(rule.next_occurrence(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(rule.next_occurrence(date(2024, 2, 1)), date(2024, 2, 29));
    }

    #[test]
    fn monthly_subscription_clamps_short_months() {
        let rule = DeadlineRule::SubscriptionMonthly { day_of_month: 30 };
        assert_eq!(rule.next_occurrence(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(rule.next_occurrence(date(2024, 2, 1)), date(2024, 2, 29));
    }

    #[test]
    fn monthly_subscription_advances_to_next_month() {
        let rule = DeadlineRule::SubscriptionMonthly { day_of_month: 15 };
        assert_eq!(rule.next_occurrence(date(2024, 6, 16)), date(2024, 7, 15));
        // December rolls over to January of next year
        assert_eq!(rule.next_occurrence(date(2024, 12, 16)), date(2025, 1, 15));
    }

    #[test]
    fn monthly_subscription_most_recent_occurrence() {
        let rule = DeadlineRule::SubscriptionMonthly { day_of_month: 15 };
        assert_eq!(
            rule.most_recent_occurrence(date(2024, 6, 14)),
            date(2024, 5, 15)
        );
        assert_eq!(
            rule.most_recent_occurrence(date(2024, 6, 15)),
            date(2024, 6, 15)
        );
        // January reaches back into December of previous year
        assert_eq!(
            rule.most_recent_occurrence(date(2024, 1, 10)),
            date(2023, 12, 15)
        );
    }

    #[test]
    fn annual_subscription_clamps_and_rolls_over() {
        let rule = DeadlineRule::SubscriptionAnnual {
            month: 2,
            day_of_month: 30,
        };
        assert_eq!(rule.next_occurrence(date(2023, 1, 1)), date(2023, 2, 28));
        assert_eq!(rule.next_occurrence(date(2023, 3, 1)), date(2024, 2, 29));
        assert_eq!(
            rule.most_recent_occurrence(date(2023, 3, 1)),
            date(2023, 2, 28)
        );
    }

    #[test]
    fn general_fixed_date_does_not_recur() {
        let deadline = date(2024, 8, 1);
        let rule = DeadlineRule::GeneralFixed { date: deadline };
        assert_eq!(rule.next_occurrence(date(2024, 7, 1)), deadline);
        assert_eq!(rule.next_occurrence(date(2024, 9, 1)), deadline);
        assert_eq!(rule.most_recent_occurrence(date(2024, 9, 1)), deadline);
    }

    #[test]
    fn it_validates_rules() {
        assert!(DeadlineRule::Birthday { month: 6, day: 15 }.validate().is_ok());
        assert!(DeadlineRule::Birthday { month: 13, day: 15 }
            .validate()
            .is_err());
        assert!(DeadlineRule::SubscriptionMonthly { day_of_month: 0 }
            .validate()
            .is_err());
        assert!(DeadlineRule::SubscriptionMonthly { day_of_month: 31 }
            .validate()
            .is_ok());
        assert!(DeadlineRule::SubscriptionAnnual {
            month: 0,
            day_of_month: 1
        }
        .validate()
        .is_err());
    }

    #[test]
    fn period_keys_follow_the_rule_kind() {
        let birthday = DeadlineRule::Birthday { month: 6, day: 15 };
        assert_eq!(
            birthday.period_key(date(2024, 6, 15)),
            PeriodKey::Year(2024)
        );

        let monthly = DeadlineRule::SubscriptionMonthly { day_of_month: 1 };
        assert_eq!(
            monthly.period_key(date(2024, 6, 1)),
            PeriodKey::PeriodStart(date(2024, 6, 1))
        );

        let general = DeadlineRule::GeneralFixed {
            date: date(2024, 8, 1),
        };
        assert_eq!(general.period_key(date(2024, 8, 1)), PeriodKey::Single);
    }
}
