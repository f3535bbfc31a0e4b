use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::attendance::{
    APPROVE_PENDING, CreatePunchRequestRequest, PunchRequest, UpdatePunchRequestRequest,
};
use crate::model::operation_log::{OperationModule, OperationType};
use crate::response::{self, AppError};
use crate::service::attendance;
use crate::service::operation_log::logged;
use crate::utils::ids::new_id;
use crate::utils::page::{PageQuery, limit_clause};

const PUNCH_COLS: &str = "id, punch_id, staff_id, staff_name, date, requested_time, reason, \
     approve_status, approver_id";

#[utoipa::path(
    post,
    path = "/api/punch_request/create",
    request_body = CreatePunchRequestRequest,
    responses((status = 200, description = "Punch correction filed, pending approval")),
    tag = "Punch"
)]
pub async fn create_punch_request(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreatePunchRequestRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        sqlx::query(
            "INSERT INTO punch_request \
             (punch_id, staff_id, staff_name, date, requested_time, reason, approve_status) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("punch"))
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(payload.date)
        .bind(payload.requested_time)
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
        "create punch request",
        result,
    )
    .await?;
    Ok(response::ok_empty("punch request created"))
}

#[utoipa::path(
    post,
    path = "/api/punch_request/edit",
    request_body = UpdatePunchRequestRequest,
    responses((status = 200, description = "Pending punch request updated")),
    tag = "Punch"
)]
pub async fn update_punch_request(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdatePunchRequestRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let updated = sqlx::query(
            "UPDATE punch_request SET staff_id = ?, staff_name = ?, date = ?, requested_time = ?, \
             reason = ? WHERE id = ? AND approve_status = ?",
        )
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(payload.date)
        .bind(payload.requested_time)
        .bind(&payload.reason)
        .bind(payload.id)
        .bind(APPROVE_PENDING)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "punch request {} not found or already processed",
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
        "update punch request",
        result,
    )
    .await?;
    Ok(response::ok_empty("punch request updated"))
}

#[utoipa::path(
    get,
    path = "/api/punch_request/query/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id, or `all`"), PageQuery),
    responses((status = 200, description = "Punch requests, newest first")),
    tag = "Punch"
)]
pub async fn query_punch_requests(
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

    let count_sql = format!("SELECT COUNT(*) FROM punch_request{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if staff_id != "all" {
        count_q = count_q.bind(&staff_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {PUNCH_COLS} FROM punch_request{where_sql} ORDER BY id DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, PunchRequest>(&data_sql);
    if staff_id != "all" {
        data_q = data_q.bind(&staff_id);
    }
    let punches = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(punches, total, ""))
}

#[utoipa::path(
    get,
    path = "/api/punch_request/approve/query/{leader_staff_id}",
    params(("leader_staff_id" = String, Path, description = "Leader staff id, or `all`")),
    responses((status = 200, description = "Pending punch requests")),
    tag = "Punch"
)]
pub async fn query_pending_punches(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let leader_staff_id = path.into_inner();

    let punches = if leader_staff_id == "all" {
        let sql = format!(
            "SELECT {PUNCH_COLS} FROM punch_request WHERE approve_status = ? ORDER BY id DESC"
        );
        sqlx::query_as::<_, PunchRequest>(&sql)
            .bind(APPROVE_PENDING)
            .fetch_all(pool)
            .await?
    } else {
        let sql = format!(
            "SELECT {PUNCH_COLS} FROM punch_request WHERE approve_status = ? AND staff_id IN \
             (SELECT staff_id FROM staff WHERE leader_staff_id = ?) ORDER BY id DESC"
        );
        sqlx::query_as::<_, PunchRequest>(&sql)
            .bind(APPROVE_PENDING)
            .bind(&leader_staff_id)
            .fetch_all(pool)
            .await?
    };

    let total = punches.len() as i64;
    Ok(response::ok_with_total(punches, total, ""))
}

/// Accept the correction: the requested time lands in the day's clock-in row
/// and the month is re-aggregated, all in one transaction.
#[utoipa::path(
    get,
    path = "/api/punch_request/approve_accept/{punch_id}",
    params(("punch_id" = String, Path, description = "Punch request id")),
    responses((status = 200, description = "Accepted; clock-in corrected")),
    tag = "Punch"
)]
pub async fn approve_punch_accept(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let punch_id = path.into_inner();
    let result = attendance::approve_punch_accept(pool, &punch_id, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Attendance,
        "accept punch request",
        result,
    )
    .await?;
    Ok(response::ok_empty("punch request accepted"))
}

#[utoipa::path(
    get,
    path = "/api/punch_request/approve_reject/{punch_id}",
    params(("punch_id" = String, Path, description = "Punch request id")),
    responses((status = 200, description = "Rejected; terminal")),
    tag = "Punch"
)]
pub async fn approve_punch_reject(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let punch_id = path.into_inner();
    let result = attendance::approve_punch_reject(pool, &punch_id, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Attendance,
        "reject punch request",
        result,
    )
    .await?;
    Ok(response::ok_empty("punch request rejected"))
}
