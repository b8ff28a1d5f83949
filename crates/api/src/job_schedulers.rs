use crate::reminders::send_contribution_reminders::SendContributionRemindersUseCase;
use crate::reminders::send_overdue_escalations::SendOverdueEscalationsUseCase;
use crate::shared::usecase::execute;
use actix_web::rt::time::{interval, sleep};
use pitchin_infra::PitchinContext;
use std::time::Duration;
use tracing::info;

const DAY_SECS: u64 = 60 * 60 * 24;

/// Seconds from the given timestamp until the next occurrence of
/// `run_hour` UTC
fn get_start_delay(now_ts_millis: i64, run_hour: u32) -> u64 {
    let now_secs = (now_ts_millis / 1000) as u64;
    let secs_into_day = now_secs % DAY_SECS;
    let run_secs = u64::from(run_hour) * 60 * 60;
    if secs_into_day < run_secs {
        run_secs - secs_into_day
    } else {
        DAY_SECS - secs_into_day + run_secs
    }
}

/// Spawns the daily reminder job. Every day at the configured UTC hour
/// it performs the forward reminder pass followed by the overdue
/// escalation pass. Both runs are idempotent within a day, so a restart
/// close to the run hour at worst skips everything as duplicates.
pub fn start_reminder_jobs(ctx: PitchinContext) {
    let delay = get_start_delay(
        ctx.sys.get_timestamp_millis(),
        ctx.config.reminder_run_hour_utc,
    );
    info!("First reminder run fires in {} seconds", delay);

    actix_web::rt::spawn(async move {
        sleep(Duration::from_secs(delay)).await;
        let mut day = interval(Duration::from_secs(DAY_SECS));
        loop {
            day.tick().await;

            if let Ok(summary) =
                execute(SendContributionRemindersUseCase { as_of: None }, &ctx).await
            {
                info!("Contribution reminder run finished: {:?}", summary);
            }
            if let Ok(summary) =
                execute(SendOverdueEscalationsUseCase { as_of: None }, &ctx).await
            {
                info!("Overdue escalation run finished: {:?}", summary);
            }
        }
    });
}

#[cfg(test)]
mod test {
    use super::*;

    // Sun Feb 21 2021 00:00:00 UTC
    const MIDNIGHT: i64 = 1613865600000;

    #[test]
    fn delay_reaches_the_run_hour_later_the_same_day() {
        assert_eq!(get_start_delay(MIDNIGHT, 7), 7 * 60 * 60);
        let six_am = MIDNIGHT + 1000 * 60 * 60 * 6;
        assert_eq!(get_start_delay(six_am, 7), 60 * 60);
    }

    #[test]
    fn delay_rolls_over_to_the_next_day_once_the_hour_passed() {
        let eight_am = MIDNIGHT + 1000 * 60 * 60 * 8;
        assert_eq!(get_start_delay(eight_am, 7), 23 * 60 * 60);
        let seven_am = MIDNIGHT + 1000 * 60 * 60 * 7;
        assert_eq!(get_start_delay(seven_am, 7), 24 * 60 * 60);
    }
}
