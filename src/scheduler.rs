// src/scheduler.rs
use chrono::NaiveDate;

/// Decides which leaderboard snapshot to fetch next. Resumes one day after
/// the most recent processed snapshot, starts from the configured date on a
/// fresh store, and never schedules today or later: leaderboards exist for
/// completed days only.
pub fn next_snapshot_date(
    today: NaiveDate,
    last_processed: Option<NaiveDate>,
    start_date: NaiveDate,
) -> Option<NaiveDate> {
    let candidate = match last_processed {
        Some(date) => date.succ_opt()?,
        None => start_date,
    };
    if candidate >= today {
        None
    } else {
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fresh_store_starts_from_configured_date() {
        let next = next_snapshot_date(d(2025, 7, 10), None, d(2025, 7, 1));
        assert_eq!(next, Some(d(2025, 7, 1)));
    }

    #[test]
    fn resumes_one_day_after_last_processed() {
        let next = next_snapshot_date(d(2025, 7, 10), Some(d(2025, 7, 3)), d(2025, 7, 1));
        assert_eq!(next, Some(d(2025, 7, 4)));
    }

    #[test]
    fn refuses_today_and_future_snapshots() {
        assert_eq!(next_snapshot_date(d(2025, 7, 10), Some(d(2025, 7, 9)), d(2025, 7, 1)), None);
        assert_eq!(next_snapshot_date(d(2025, 7, 10), Some(d(2025, 7, 15)), d(2025, 7, 1)), None);
        assert_eq!(next_snapshot_date(d(2025, 7, 1), None, d(2025, 7, 1)), None);
    }

    #[test]
    fn rolls_across_month_boundaries() {
        let next = next_snapshot_date(d(2025, 8, 2), Some(d(2025, 7, 31)), d(2025, 7, 1));
        assert_eq!(next, Some(d(2025, 8, 1)));
    }
}
