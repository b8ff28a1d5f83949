use chrono::{NaiveDate, TimeZone, Utc};

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64;

    /// The current calendar day in UTC. All deadline arithmetic works
    /// on whole days, so the time of day is dropped here and never
    /// leaks into day-difference computations.
    fn get_date_today(&self) -> NaiveDate {
        Utc.timestamp_millis(self.get_timestamp_millis())
            .naive_utc()
            .date()
    }
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct StaticSys(i64);
    impl ISys for StaticSys {
        fn get_timestamp_millis(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn today_is_derived_from_the_timestamp() {
        // Sun Feb 21 2021 00:00:00 UTC
        let sys = StaticSys(1613865600000);
        assert_eq!(sys.get_date_today(), NaiveDate::from_ymd(2021, 2, 21));
        // One millisecond before midnight is still the same day
        let sys = StaticSys(1613865600000 + 1000 * 60 * 60 * 24 - 1);
        assert_eq!(sys.get_date_today(), NaiveDate::from_ymd(2021, 2, 21));
    }
}
