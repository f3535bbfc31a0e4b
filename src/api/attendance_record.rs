use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::attendance::{
    APPROVE_PENDING, APPROVE_REJECTED, AttendanceRecord, CreateAttendanceRecordRequest,
    UpdateAttendanceRecordRequest,
};
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::salary::IS_PAY_PAID;
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::service::{attendance, payroll};
use crate::utils::ids::new_id;
use crate::utils::page::{PageQuery, limit_clause};

const RECORD_COLS: &str = "id, attendance_id, staff_id, staff_name, date, work_days, leave_days, \
     overtime_days, approve";

#[utoipa::path(
    post,
    path = "/api/attendance_record/create",
    request_body = CreateAttendanceRecordRequest,
    responses((status = 200, description = "Record created; Conflict if the month already exists")),
    tag = "Attendance"
)]
pub async fn create_attendance_record(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateAttendanceRecordRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    attendance::month_bounds(&payload.date)?;

    let result = async {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance_record WHERE staff_id = ? AND date = ?",
        )
        .bind(&payload.staff_id)
        .bind(&payload.date)
        .fetch_one(pool)
        .await?;
        if existing != 0 {
            return Err(AppError::Conflict(format!(
                "attendance for {} {} already exists",
                payload.staff_id, payload.date
            )));
        }

        sqlx::query(
            "INSERT INTO attendance_record \
             (attendance_id, staff_id, staff_name, date, work_days, leave_days, overtime_days, approve) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("attendance_record"))
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(&payload.date)
        .bind(payload.work_days)
        .bind(payload.leave_days)
        .bind(payload.overtime_days)
        .bind(APPROVE_PENDING)
        .execute(pool)
        .await?;
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Create,
        OperationModule::Attendance,
        "create attendance record",
        result,
    )
    .await?;
    Ok(response::ok_empty("attendance record created"))
}

/// Manual edit: the row is updated, then the month is re-aggregated from the
/// raw punches and goes back to pending approval.
#[utoipa::path(
    post,
    path = "/api/attendance_record/edit",
    request_body = UpdateAttendanceRecordRequest,
    responses((status = 200, description = "Record updated and re-aggregated")),
    tag = "Attendance"
)]
pub async fn update_attendance_record(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateAttendanceRecordRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    attendance::month_bounds(&payload.date)?;

    let result = async {
        let updated = sqlx::query(
            "UPDATE attendance_record SET staff_id = ?, staff_name = ?, date = ?, work_days = ?, \
             leave_days = ?, overtime_days = ?, approve = ? WHERE id = ?",
        )
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(&payload.date)
        .bind(payload.work_days)
        .bind(payload.leave_days)
        .bind(payload.overtime_days)
        .bind(APPROVE_PENDING)
        .bind(payload.id)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "attendance record {} not found",
                payload.id
            )));
        }

        let mut conn = pool.acquire().await?;
        attendance::recompute_month(&mut conn, &payload.staff_id, &payload.date, APPROVE_PENDING)
            .await?;
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Attendance,
        "update attendance record",
        result,
    )
    .await?;
    Ok(response::ok_empty("attendance record updated"))
}

#[utoipa::path(
    delete,
    path = "/api/attendance_record/delete/{attendance_id}",
    params(("attendance_id" = String, Path, description = "Attendance record id")),
    responses((status = 200, description = "Record deleted")),
    tag = "Attendance"
)]
pub async fn delete_attendance_record(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let attendance_id = path.into_inner();

    let result = async {
        let deleted = sqlx::query("DELETE FROM attendance_record WHERE attendance_id = ?")
            .bind(&attendance_id)
            .execute(pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "attendance record {attendance_id} not found"
            )));
        }
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Attendance,
        "delete attendance record",
        result,
    )
    .await?;
    Ok(response::ok_empty("attendance record deleted"))
}

/// Per-staff records, or every staff member's with `staff_id = all`.
#[utoipa::path(
    get,
    path = "/api/attendance_record/query/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id, or `all`"), PageQuery),
    responses((status = 200, description = "Attendance records, newest month first")),
    tag = "Attendance"
)]
pub async fn query_attendance_records(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let staff_id = path.into_inner();
    let (start, limit) = query.window();

    let mut where_sql = String::new();
    if staff_id != "all" {
        where_sql.push_str(" WHERE staff_id = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance_record{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if staff_id != "all" {
        count_q = count_q.bind(&staff_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {RECORD_COLS} FROM attendance_record{where_sql} ORDER BY date DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, AttendanceRecord>(&data_sql);
    if staff_id != "all" {
        data_q = data_q.bind(&staff_id);
    }
    let records = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(records, total, ""))
}

/// Records whose month has been paid out (the immutable history view).
#[utoipa::path(
    get,
    path = "/api/attendance_record/query_history/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id, or `all`"), PageQuery),
    responses((status = 200, description = "Attendance records of paid months")),
    tag = "Attendance"
)]
pub async fn query_attendance_history(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let staff_id = path.into_inner();
    let (start, limit) = query.window();

    let mut where_sql = String::from(" WHERE s.is_pay = ?");
    if staff_id != "all" {
        where_sql.push_str(" AND a.staff_id = ?");
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM attendance_record a \
         INNER JOIN salary_record s ON a.staff_id = s.staff_id AND a.date = s.salary_date{where_sql}"
    );
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(IS_PAY_PAID);
    if staff_id != "all" {
        count_q = count_q.bind(&staff_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT a.id, a.attendance_id, a.staff_id, a.staff_name, a.date, a.work_days, \
         a.leave_days, a.overtime_days, a.approve FROM attendance_record a \
         INNER JOIN salary_record s ON a.staff_id = s.staff_id AND a.date = s.salary_date\
         {where_sql} ORDER BY a.date DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, AttendanceRecord>(&data_sql).bind(IS_PAY_PAID);
    if staff_id != "all" {
        data_q = data_q.bind(&staff_id);
    }
    let records = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(records, total, ""))
}

/// Whether the month's salary has already been paid out.
#[utoipa::path(
    get,
    path = "/api/attendance_record/get_attend_record_is_pay/{staff_id}/{date}",
    params(
        ("staff_id" = String, Path, description = "Staff id"),
        ("date" = String, Path, description = "Month key, YYYY-MM")
    ),
    responses((status = 200, description = "true when the month is paid")),
    tag = "Attendance"
)]
pub async fn attendance_is_paid(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let (staff_id, date) = path.into_inner();
    let paid = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM salary_record WHERE staff_id = ? AND salary_date = ? AND is_pay = ?",
    )
    .bind(&staff_id)
    .bind(&date)
    .bind(IS_PAY_PAID)
    .fetch_one(pool)
    .await?;
    Ok(response::ok(paid != 0, ""))
}

/// Pending records awaiting a leader's approval; `all` lists every pending
/// record, otherwise only the leader's direct reports.
#[utoipa::path(
    get,
    path = "/api/attendance_record/approve/query/{leader_staff_id}",
    params(("leader_staff_id" = String, Path, description = "Leader staff id, or `all`")),
    responses((status = 200, description = "Pending attendance records")),
    tag = "Attendance"
)]
pub async fn query_pending_approvals(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let leader_staff_id = path.into_inner();

    let records = if leader_staff_id == "all" {
        let sql = format!(
            "SELECT {RECORD_COLS} FROM attendance_record WHERE approve = ? ORDER BY date DESC"
        );
        sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(APPROVE_PENDING)
            .fetch_all(pool)
            .await?
    } else {
        let sql = format!(
            "SELECT {RECORD_COLS} FROM attendance_record WHERE approve = ? AND staff_id IN \
             (SELECT staff_id FROM staff WHERE leader_staff_id = ?) ORDER BY date DESC"
        );
        sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(APPROVE_PENDING)
            .bind(&leader_staff_id)
            .fetch_all(pool)
            .await?
    };

    let total = records.len() as i64;
    Ok(response::ok_with_total(records, total, ""))
}

/// Accept the month: the approve flag flips and the payroll calculator runs
/// for that staff+month as one transaction: both succeed or neither does.
#[utoipa::path(
    get,
    path = "/api/attendance_record/approve_accept/{attendance_id}",
    params(("attendance_id" = String, Path, description = "Attendance record id")),
    responses((status = 200, description = "Approved; salary record computed")),
    tag = "Attendance"
)]
pub async fn approve_accept(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let attendance_id = path.into_inner();
    let result = payroll::compute_for_attendance(pool, &attendance_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Attendance,
        "approve attendance record",
        result,
    )
    .await?;
    Ok(response::ok_empty("attendance approved, salary computed"))
}

#[utoipa::path(
    get,
    path = "/api/attendance_record/approve_reject/{attendance_id}",
    params(("attendance_id" = String, Path, description = "Attendance record id")),
    responses((status = 200, description = "Rejected; terminal")),
    tag = "Attendance"
)]
pub async fn approve_reject(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let attendance_id = path.into_inner();

    let result = async {
        let updated = sqlx::query(
            "UPDATE attendance_record SET approve = ? WHERE attendance_id = ? AND approve = ?",
        )
        .bind(APPROVE_REJECTED)
        .bind(&attendance_id)
        .bind(APPROVE_PENDING)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "attendance record {attendance_id} not found or already processed"
            )));
        }
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Attendance,
        "reject attendance record",
        result,
    )
    .await?;
    Ok(response::ok_empty("attendance rejected"))
}
