// src/services/schedule.rs
use chrono::{Months, NaiveDate};
use log::debug;

/// `count` dates spaced three calendar months apart, the first one quarter
/// after `base`. Month-end overflow clamps to the last day of the month.
pub fn quarterly_dates(base: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (1..=count as u32)
        .map_while(|k| base.checked_add_months(Months::new(3 * k)))
        .collect()
}

/// Future earnings anchors. A known next report date strictly after `today`
/// becomes the first anchor and the rest follow quarterly from it; one dated
/// today counts as already reported.
pub fn earnings_schedule(today: NaiveDate, next_known: Option<NaiveDate>, count: usize) -> Vec<NaiveDate> {
    if count == 0 {
        return Vec::new();
    }
    match next_known {
        Some(next) if next > today => {
            let mut dates = vec![next];
            dates.extend(quarterly_dates(next, count - 1));
            dates
        }
        Some(stale) => {
            debug!("Ignoring reported earnings date {} (today is {})", stale, today);
            quarterly_dates(today, count)
        }
        None => quarterly_dates(today, count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_quarterly_dates_start_one_interval_out() {
        let dates = quarterly_dates(d(2024, 1, 15), 4);
        assert_eq!(dates, vec![d(2024, 4, 15), d(2024, 7, 15), d(2024, 10, 15), d(2025, 1, 15)]);
    }

    #[test]
    fn test_quarterly_dates_clamp_month_end() {
        let dates = quarterly_dates(d(2023, 11, 30), 2);
        assert_eq!(dates, vec![d(2024, 2, 29), d(2024, 5, 30)]);
    }

    #[test]
    fn test_schedule_uses_known_next_date() {
        let dates = earnings_schedule(d(2024, 1, 15), Some(d(2024, 2, 1)), 3);
        assert_eq!(dates, vec![d(2024, 2, 1), d(2024, 5, 1), d(2024, 8, 1)]);
    }

    #[test]
    fn test_schedule_ignores_stale_next_date() {
        let dates = earnings_schedule(d(2024, 1, 15), Some(d(2023, 12, 1)), 2);
        assert_eq!(dates, vec![d(2024, 4, 15), d(2024, 7, 15)]);
        assert!(earnings_schedule(d(2024, 1, 15), None, 0).is_empty());
    }

    #[test]
    fn test_schedule_treats_report_today_as_done() {
        let today = d(2024, 1, 15);
        let dates = earnings_schedule(today, Some(today), 3);
        assert_eq!(dates, quarterly_dates(today, 3));
        assert!(dates.iter().all(|date| *date > today));
    }
}
