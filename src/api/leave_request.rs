use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::attendance::{
    APPROVE_PENDING, CreateLeaveRequestRequest, LeaveRequest, UpdateLeaveRequestRequest,
};
use crate::model::operation_log::{OperationModule, OperationType};
use crate::response::{self, AppError};
use crate::service::attendance;
use crate::service::operation_log::logged;
use crate::utils::ids::new_id;
use crate::utils::page::{PageQuery, limit_clause};

const LEAVE_COLS: &str = "id, leave_id, staff_id, staff_name, start_date, end_date, leave_type, \
     reason, approve_status, approver_id";

#[utoipa::path(
    post,
    path = "/api/leave_request/create",
    request_body = CreateLeaveRequestRequest,
    responses((status = 200, description = "Leave request filed, pending approval")),
    tag = "Leave"
)]
pub async fn create_leave_request(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateLeaveRequestRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        if payload.end_date < payload.start_date {
            return Err(AppError::Validation(
                "end_date must not precede start_date".to_string(),
            ));
        }
        sqlx::query(
            "INSERT INTO leave_request \
             (leave_id, staff_id, staff_name, start_date, end_date, leave_type, reason, approve_status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("leave"))
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(&payload.leave_type)
        .bind(&payload.reason)
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
        "create leave request",
        result,
    )
    .await?;
    Ok(response::ok_empty("leave request created"))
}

#[utoipa::path(
    post,
    path = "/api/leave_request/edit",
    request_body = UpdateLeaveRequestRequest,
    responses((status = 200, description = "Pending leave request updated")),
    tag = "Leave"
)]
pub async fn update_leave_request(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateLeaveRequestRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        if payload.end_date < payload.start_date {
            return Err(AppError::Validation(
                "end_date must not precede start_date".to_string(),
            ));
        }
        let updated = sqlx::query(
            "UPDATE leave_request SET staff_id = ?, staff_name = ?, start_date = ?, end_date = ?, \
             leave_type = ?, reason = ? WHERE id = ? AND approve_status = ?",
        )
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(&payload.leave_type)
        .bind(&payload.reason)
        .bind(payload.id)
        .bind(APPROVE_PENDING)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "leave request {} not found or already processed",
                payload.id
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
        "update leave request",
        result,
    )
    .await?;
    Ok(response::ok_empty("leave request updated"))
}

#[utoipa::path(
    get,
    path = "/api/leave_request/query/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id, or `all`"), PageQuery),
    responses((status = 200, description = "Leave requests, newest first")),
    tag = "Leave"
)]
pub async fn query_leave_requests(
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

    let count_sql = format!("SELECT COUNT(*) FROM leave_request{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if staff_id != "all" {
        count_q = count_q.bind(&staff_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {LEAVE_COLS} FROM leave_request{where_sql} ORDER BY id DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    if staff_id != "all" {
        data_q = data_q.bind(&staff_id);
    }
    let leaves = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(leaves, total, ""))
}

#[utoipa::path(
    get,
    path = "/api/leave_request/approve/query/{leader_staff_id}",
    params(("leader_staff_id" = String, Path, description = "Leader staff id, or `all`")),
    responses((status = 200, description = "Pending leave requests")),
    tag = "Leave"
)]
pub async fn query_pending_leaves(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let leader_staff_id = path.into_inner();

    let leaves = if leader_staff_id == "all" {
        let sql = format!(
            "SELECT {LEAVE_COLS} FROM leave_request WHERE approve_status = ? ORDER BY id DESC"
        );
        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(APPROVE_PENDING)
            .fetch_all(pool)
            .await?
    } else {
        let sql = format!(
            "SELECT {LEAVE_COLS} FROM leave_request WHERE approve_status = ? AND staff_id IN \
             (SELECT staff_id FROM staff WHERE leader_staff_id = ?) ORDER BY id DESC"
        );
        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(APPROVE_PENDING)
            .bind(&leader_staff_id)
            .fetch_all(pool)
            .await?
    };

    let total = leaves.len() as i64;
    Ok(response::ok_with_total(leaves, total, ""))
}

/// Accept the leave: status write plus the attendance re-aggregation of every
/// month the leave touches, in one transaction.
#[utoipa::path(
    get,
    path = "/api/leave_request/approve_accept/{leave_id}",
    params(("leave_id" = String, Path, description = "Leave request id")),
    responses((status = 200, description = "Accepted; attendance re-aggregated")),
    tag = "Leave"
)]
pub async fn approve_leave_accept(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let leave_id = path.into_inner();
    let result = attendance::approve_leave_accept(pool, &leave_id, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Attendance,
        "accept leave request",
        result,
    )
    .await?;
    Ok(response::ok_empty("leave request accepted"))
}

#[utoipa::path(
    get,
    path = "/api/leave_request/approve_reject/{leave_id}",
    params(("leave_id" = String, Path, description = "Leave request id")),
    responses((status = 200, description = "Rejected; terminal")),
    tag = "Leave"
)]
pub async fn approve_leave_reject(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let leave_id = path.into_inner();
    let result = attendance::approve_leave_reject(pool, &leave_id, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Attendance,
        "reject leave request",
        result,
    )
    .await?;
    Ok(response::ok_empty("leave request rejected"))
}
