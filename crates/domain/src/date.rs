use chrono::NaiveDate;

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month - 1 {
        0 => 31,
        1 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        2 => 31,
        3 => 30,
        4 => 31,
        5 => 30,
        6 => 31,
        7 => 31,
        8 => 30,
        9 => 31,
        10 => 30,
        11 => 31,
        _ => panic!("Invalid month"),
    }
}

/// Clamps a day of month to the last day of the given month,
/// e.g. Feb 30 -> Feb 28 (or Feb 29 in leap years)
pub fn clamped_day(year: i32, month: u32, day: u32) -> u32 {
    std::cmp::min(day, get_month_length(year, month))
}

/// Constructs a date where the day of month is clamped to
/// the length of the month
pub fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd(year, month, clamped_day(year, month, day))
}

/// Whole days from `from` to `to`. Negative if `to` is before `from`.
/// `NaiveDate` has no time of day so the difference is always an
/// exact number of days.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_computes_leap_years() {
        for year in &[2000, 2020, 2024] {
            assert!(is_leap_year(*year));
        }
        for year in &[1900, 2021, 2023, 2100] {
            assert!(!is_leap_year(*year));
        }
    }

    #[test]
    fn it_computes_month_lengths() {
        assert_eq!(get_month_length(2023, 2), 28);
        assert_eq!(get_month_length(2024, 2), 29);
        assert_eq!(get_month_length(2024, 4), 30);
        assert_eq!(get_month_length(2024, 12), 31);
    }

    #[test]
    fn it_clamps_days_to_month_length() {
        assert_eq!(clamped_day(2023, 2, 30), 28);
        assert_eq!(clamped_day(2024, 2, 30), 29);
        assert_eq!(clamped_day(2024, 4, 31), 30);
        assert_eq!(clamped_day(2024, 1, 31), 31);
        assert_eq!(clamped_day(2024, 1, 15), 15);
    }

    #[test]
    fn it_computes_day_differences() {
        let d1 = NaiveDate::from_ymd(2024, 6, 10);
        let d2 = NaiveDate::from_ymd(2024, 6, 15);
        assert_eq!(days_between(d1, d2), 5);
        assert_eq!(days_between(d2, d1), -5);
        assert_eq!(days_between(d1, d1), 0);
        // Across a year boundary
        assert_eq!(
            days_between(
                NaiveDate::from_ymd(2023, 12, 31),
                NaiveDate::from_ymd(2024, 1, 1)
            ),
            1
        );
    }
}
