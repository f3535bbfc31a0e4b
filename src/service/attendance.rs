//! Monthly attendance aggregation. One counting function serves both
//! invocation paths: the scheduled month-end batch (pre-approved result) and
//! the event-driven recompute after an attendance edit or an approved
//! leave/punch request (result goes back to pending). Idempotent per
//! (staff, month): the upsert overwrites counters in place, no correction
//! history is kept.

use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use sqlx::{MySqlConnection, MySqlPool};

use crate::db::Tenants;
use crate::model::attendance::{
    APPROVE_ACCEPTED, APPROVE_PENDING, APPROVE_REJECTED, ClockIn, LeaveRequest, PunchRequest,
};
use crate::model::staff::STATUS_RESIGNED;
use crate::response::AppError;
use crate::utils::ids::new_id;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub work_days: i64,
    pub leave_days: i64,
    pub overtime_days: i64,
}

/// Check-out later than this counts the day as overtime.
fn overtime_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 30, 0).unwrap()
}

/// First and last calendar day of a `YYYY-MM` month key.
pub fn month_bounds(month: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("month must be YYYY-MM, got '{month}'")))?;
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .ok_or_else(|| AppError::Validation(format!("month out of range: '{month}'")))?;
    let last = next_first
        .pred_opt()
        .ok_or_else(|| AppError::Validation(format!("month out of range: '{month}'")))?;
    Ok((first, last))
}

/// Derive the month's counters from raw punches and approved leave requests.
/// A work day needs both punches; leave days are the inclusive intersection
/// of each approved request with the month.
pub fn aggregate_month(
    clock_ins: &[ClockIn],
    leaves: &[LeaveRequest],
    first: NaiveDate,
    last: NaiveDate,
) -> MonthlyTotals {
    let mut totals = MonthlyTotals::default();

    for clock_in in clock_ins {
        if clock_in.date < first || clock_in.date > last {
            continue;
        }
        let (Some(_), Some(check_out)) = (clock_in.check_in_time, clock_in.check_out_time) else {
            continue;
        };
        totals.work_days += 1;
        if check_out > overtime_cutoff() {
            totals.overtime_days += 1;
        }
    }

    for leave in leaves {
        if leave.approve_status != APPROVE_ACCEPTED {
            continue;
        }
        let start = leave.start_date.max(first);
        let end = leave.end_date.min(last);
        if end >= start {
            totals.leave_days += (end - start).num_days() + 1;
        }
    }

    totals
}

/// Recompute one staff member's month from current rows and upsert the
/// attendance record with the given approve flag.
pub async fn recompute_month(
    conn: &mut MySqlConnection,
    staff_id: &str,
    month: &str,
    approve: i64,
) -> Result<MonthlyTotals, AppError> {
    let (first, last) = month_bounds(month)?;

    let clock_ins = sqlx::query_as::<_, ClockIn>(
        "SELECT id, clock_in_id, staff_id, staff_name, date, check_in_time, check_out_time, status \
         FROM clock_in WHERE staff_id = ? AND date >= ? AND date <= ?",
    )
    .bind(staff_id)
    .bind(first)
    .bind(last)
    .fetch_all(&mut *conn)
    .await?;

    let leaves = sqlx::query_as::<_, LeaveRequest>(
        "SELECT id, leave_id, staff_id, staff_name, start_date, end_date, leave_type, reason, \
         approve_status, approver_id \
         FROM leave_request WHERE staff_id = ? AND approve_status = ? \
         AND start_date <= ? AND end_date >= ?",
    )
    .bind(staff_id)
    .bind(APPROVE_ACCEPTED)
    .bind(last)
    .bind(first)
    .fetch_all(&mut *conn)
    .await?;

    let totals = aggregate_month(&clock_ins, &leaves, first, last);

    let existing = sqlx::query_as::<_, (u64,)>(
        "SELECT id FROM attendance_record WHERE staff_id = ? AND date = ?",
    )
    .bind(staff_id)
    .bind(month)
    .fetch_optional(&mut *conn)
    .await?;

    match existing {
        Some((record_id,)) => {
            sqlx::query(
                "UPDATE attendance_record SET work_days = ?, leave_days = ?, overtime_days = ?, \
                 approve = ? WHERE id = ?",
            )
            .bind(totals.work_days)
            .bind(totals.leave_days)
            .bind(totals.overtime_days)
            .bind(approve)
            .bind(record_id)
            .execute(&mut *conn)
            .await?;
        }
        None => {
            let staff_name =
                sqlx::query_as::<_, (String,)>("SELECT staff_name FROM staff WHERE staff_id = ?")
                    .bind(staff_id)
                    .fetch_optional(&mut *conn)
                    .await?
                    .map(|row| row.0)
                    .unwrap_or_default();
            sqlx::query(
                "INSERT INTO attendance_record \
                 (attendance_id, staff_id, staff_name, date, work_days, leave_days, \
                  overtime_days, approve) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(new_id("attendance_record"))
            .bind(staff_id)
            .bind(staff_name)
            .bind(month)
            .bind(totals.work_days)
            .bind(totals.leave_days)
            .bind(totals.overtime_days)
            .bind(approve)
            .execute(&mut *conn)
            .await?;
        }
    }

    Ok(totals)
}

/// Month keys (`YYYY-MM`) touched by an inclusive date range.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let mut months = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    let (end_year, end_month) = (end.year(), end.month());
    while (year, month) <= (end_year, end_month) {
        months.push(format!("{year:04}-{month:02}"));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// Accept a leave request and re-aggregate every month it touches, in one
/// transaction: the status write and the recomputes land together or not at
/// all. The recomputed records go back to pending re-approval.
pub async fn approve_leave_accept(
    pool: &MySqlPool,
    leave_id: &str,
    approver_id: &str,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let leave = sqlx::query_as::<_, LeaveRequest>(
        "SELECT id, leave_id, staff_id, staff_name, start_date, end_date, leave_type, reason, \
         approve_status, approver_id FROM leave_request WHERE leave_id = ?",
    )
    .bind(leave_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("leave request {leave_id} not found")))?;

    if leave.approve_status != APPROVE_PENDING {
        return Err(AppError::Conflict(format!(
            "leave request {leave_id} has already been processed"
        )));
    }

    sqlx::query("UPDATE leave_request SET approve_status = ?, approver_id = ? WHERE leave_id = ?")
        .bind(APPROVE_ACCEPTED)
        .bind(approver_id)
        .bind(leave_id)
        .execute(&mut *tx)
        .await?;

    for month in months_between(leave.start_date, leave.end_date) {
        recompute_month(&mut tx, &leave.staff_id, &month, APPROVE_PENDING).await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn approve_leave_reject(
    pool: &MySqlPool,
    leave_id: &str,
    approver_id: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE leave_request SET approve_status = ?, approver_id = ? \
         WHERE leave_id = ? AND approve_status = ?",
    )
    .bind(APPROVE_REJECTED)
    .bind(approver_id)
    .bind(leave_id)
    .bind(APPROVE_PENDING)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "leave request {leave_id} not found or already processed"
        )));
    }
    Ok(())
}

/// Accept a punch-correction: write the requested time into the day's
/// clock-in row, then re-aggregate that month, all in one transaction.
pub async fn approve_punch_accept(
    pool: &MySqlPool,
    punch_id: &str,
    approver_id: &str,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let punch = sqlx::query_as::<_, PunchRequest>(
        "SELECT id, punch_id, staff_id, staff_name, date, requested_time, reason, \
         approve_status, approver_id FROM punch_request WHERE punch_id = ?",
    )
    .bind(punch_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("punch request {punch_id} not found")))?;

    if punch.approve_status != APPROVE_PENDING {
        return Err(AppError::Conflict(format!(
            "punch request {punch_id} has already been processed"
        )));
    }

    sqlx::query("UPDATE punch_request SET approve_status = ?, approver_id = ? WHERE punch_id = ?")
        .bind(APPROVE_ACCEPTED)
        .bind(approver_id)
        .bind(punch_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE clock_in SET check_in_time = ?, status = 0 WHERE staff_id = ? AND date = ?",
    )
    .bind(punch.requested_time)
    .bind(&punch.staff_id)
    .bind(punch.date)
    .execute(&mut *tx)
    .await?;

    let month = punch.date.format("%Y-%m").to_string();
    recompute_month(&mut tx, &punch.staff_id, &month, APPROVE_PENDING).await?;

    tx.commit().await?;
    Ok(())
}

pub async fn approve_punch_reject(
    pool: &MySqlPool,
    punch_id: &str,
    approver_id: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE punch_request SET approve_status = ?, approver_id = ? \
         WHERE punch_id = ? AND approve_status = ?",
    )
    .bind(APPROVE_REJECTED)
    .bind(approver_id)
    .bind(punch_id)
    .bind(APPROVE_PENDING)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "punch request {punch_id} not found or already processed"
        )));
    }
    Ok(())
}

/// Month-end batch: every branch sequentially, every non-resigned staff
/// member sequentially. Per-staff failures are logged and skipped; there is
/// no checkpointing, so a crashed run simply leaves later staff for the next
/// scheduled run.
pub async fn run_monthly_batch(tenants: &Tenants) {
    let month = Local::now().format("%Y-%m").to_string();
    for (branch, pool) in tenants.iter() {
        tracing::info!(branch = %branch, month = %month, "monthly attendance batch started");
        match batch_branch(pool, &month).await {
            Ok(count) => {
                tracing::info!(branch = %branch, staff = count, "monthly attendance batch finished")
            }
            Err(e) => {
                tracing::error!(branch = %branch, error = %e, "monthly attendance batch failed")
            }
        }
    }
}

async fn batch_branch(pool: &MySqlPool, month: &str) -> Result<usize, AppError> {
    let staff_ids = sqlx::query_as::<_, (String,)>("SELECT staff_id FROM staff WHERE status != ?")
        .bind(STATUS_RESIGNED)
        .fetch_all(pool)
        .await?;

    let mut conn = pool.acquire().await?;
    let mut processed = 0usize;
    for (staff_id,) in staff_ids {
        match recompute_month(&mut conn, &staff_id, month, APPROVE_ACCEPTED).await {
            Ok(_) => processed += 1,
            Err(e) => {
                tracing::error!(staff_id = %staff_id, error = %e, "attendance aggregation failed")
            }
        }
    }
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::APPROVE_PENDING;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn punch(d: u32, check_in: Option<(u32, u32)>, check_out: Option<(u32, u32)>) -> ClockIn {
        ClockIn {
            id: d as u64,
            clock_in_id: format!("clock_in_{d}"),
            staff_id: "H1a2b3".to_string(),
            staff_name: "张三".to_string(),
            date: day(d),
            check_in_time: check_in.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            check_out_time: check_out.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            status: 0,
        }
    }

    fn leave(start: NaiveDate, end: NaiveDate, approve_status: i64) -> LeaveRequest {
        LeaveRequest {
            id: 1,
            leave_id: "leave_test".to_string(),
            staff_id: "H1a2b3".to_string(),
            staff_name: "张三".to_string(),
            start_date: start,
            end_date: end,
            leave_type: "personal".to_string(),
            reason: None,
            approve_status,
            approver_id: None,
        }
    }

    #[test]
    fn month_bounds_handle_year_rollover() {
        assert_eq!(
            month_bounds("2024-12").unwrap(),
            (
                NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
            )
        );
        assert_eq!(
            month_bounds("2024-02").unwrap().1,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(month_bounds("2024-13").is_err());
        assert!(month_bounds("junk").is_err());
    }

    #[test]
    fn twenty_full_days_no_overtime() {
        let clock_ins: Vec<ClockIn> = (1..=20)
            .map(|d| punch(d, Some((9, 0)), Some((18, 0))))
            .collect();
        let (first, last) = month_bounds("2024-06").unwrap();
        let totals = aggregate_month(&clock_ins, &[], first, last);
        assert_eq!(
            totals,
            MonthlyTotals {
                work_days: 20,
                leave_days: 0,
                overtime_days: 0
            }
        );
    }

    #[test]
    fn checkout_after_cutoff_counts_overtime() {
        let clock_ins = vec![
            punch(3, Some((9, 0)), Some((18, 30))), // exactly 18:30 is not overtime
            punch(4, Some((9, 0)), Some((18, 31))),
            punch(5, Some((9, 0)), Some((21, 0))),
        ];
        let (first, last) = month_bounds("2024-06").unwrap();
        let totals = aggregate_month(&clock_ins, &[], first, last);
        assert_eq!(totals.work_days, 3);
        assert_eq!(totals.overtime_days, 2);
    }

    #[test]
    fn missing_punch_is_not_a_work_day() {
        let clock_ins = vec![
            punch(3, Some((9, 0)), None),
            punch(4, None, Some((18, 0))),
            punch(5, Some((9, 0)), Some((18, 0))),
        ];
        let (first, last) = month_bounds("2024-06").unwrap();
        assert_eq!(aggregate_month(&clock_ins, &[], first, last).work_days, 1);
    }

    #[test]
    fn leave_days_are_clipped_to_the_month() {
        let (first, last) = month_bounds("2024-06").unwrap();
        // May 28 .. June 3 overlaps June by 3 days
        let leaves = vec![leave(
            NaiveDate::from_ymd_opt(2024, 5, 28).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            APPROVE_ACCEPTED,
        )];
        assert_eq!(aggregate_month(&[], &leaves, first, last).leave_days, 3);
    }

    #[test]
    fn single_day_leave_counts_one() {
        let (first, last) = month_bounds("2024-06").unwrap();
        let leaves = vec![leave(day(10), day(10), APPROVE_ACCEPTED)];
        assert_eq!(aggregate_month(&[], &leaves, first, last).leave_days, 1);
    }

    #[test]
    fn pending_and_rejected_leaves_are_ignored() {
        let (first, last) = month_bounds("2024-06").unwrap();
        let leaves = vec![
            leave(day(10), day(12), APPROVE_PENDING),
            leave(day(20), day(21), 2),
        ];
        assert_eq!(aggregate_month(&[], &leaves, first, last).leave_days, 0);
    }

    #[test]
    fn months_between_spans_year_boundaries() {
        assert_eq!(
            months_between(
                NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
            ),
            vec!["2024-11", "2024-12", "2025-01"]
        );
        assert_eq!(
            months_between(day(5), day(7)),
            vec!["2024-06"]
        );
    }

    #[test]
    fn punches_outside_the_month_are_ignored() {
        let (first, last) = month_bounds("2024-06").unwrap();
        let mut outside = punch(1, Some((9, 0)), Some((18, 0)));
        outside.date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(aggregate_month(&[outside], &[], first, last).work_days, 0);
    }
}
