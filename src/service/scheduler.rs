//! Month-end trigger for the attendance batch: sleep until the last calendar
//! day of the month at 23:59 local, run the aggregation over every branch,
//! then wait for the next month.

use std::time::Duration;

use actix_web::web::Data;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

use crate::db::Tenants;
use crate::service::attendance;

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_first.and_then(|d| d.pred_opt())
}

/// Duration from `now` until the next month-end fire time (last calendar day,
/// 23:59). When the current month's slot has passed, it targets next month.
pub fn duration_until_month_end(now: NaiveDateTime) -> Duration {
    let mut year = now.year();
    let mut month = now.month();

    for _ in 0..2 {
        if let Some(target) = last_day_of_month(year, month)
            .and_then(|d| d.and_hms_opt(23, 59, 0))
            .filter(|t| *t > now)
        {
            return (target - now).to_std().unwrap_or(Duration::from_secs(60));
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    Duration::from_secs(60)
}

pub async fn run(tenants: Data<Tenants>) {
    tracing::info!("attendance batch scheduler started");
    loop {
        let sleep_for = duration_until_month_end(Local::now().naive_local());
        tracing::info!(
            minutes = sleep_for.as_secs() / 60,
            "next attendance batch scheduled"
        );
        tokio::time::sleep(sleep_for).await;

        attendance::run_monthly_batch(&tenants).await;

        // step past the fire minute before computing the next slot
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_the_last_day_of_the_current_month() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let d = duration_until_month_end(now);
        let expected = NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(d, (expected - now).to_std().unwrap());
    }

    #[test]
    fn rolls_to_next_month_when_slot_has_passed() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(23, 59, 30)
            .unwrap();
        let d = duration_until_month_end(now);
        let expected = NaiveDate::from_ymd_opt(2024, 7, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(d, (expected - now).to_std().unwrap());
    }

    #[test]
    fn december_rolls_into_january() {
        let now = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 30)
            .unwrap();
        let d = duration_until_month_end(now);
        let expected = NaiveDate::from_ymd_opt(2025, 1, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(d, (expected - now).to_std().unwrap());
    }
}
