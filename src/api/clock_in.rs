use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::attendance::{APPROVE_PENDING, ClockIn, CreateClockInRequest, UpdateClockInRequest};
use crate::model::operation_log::{OperationModule, OperationType};
use crate::response::{self, AppError};
use crate::service::attendance;
use crate::service::operation_log::logged;
use crate::utils::ids::new_id;
use crate::utils::page::{PageQuery, limit_clause};

const CLOCK_IN_COLS: &str =
    "id, clock_in_id, staff_id, staff_name, date, check_in_time, check_out_time, status";

#[utoipa::path(
    post,
    path = "/api/clock_in/create",
    request_body = CreateClockInRequest,
    responses((status = 200, description = "Punch recorded; Conflict for a second punch that day")),
    tag = "ClockIn"
)]
pub async fn create_clock_in(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateClockInRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM clock_in WHERE staff_id = ? AND date = ?",
        )
        .bind(&payload.staff_id)
        .bind(payload.date)
        .fetch_one(pool)
        .await?;
        if existing != 0 {
            return Err(AppError::Conflict(format!(
                "clock-in for {} on {} already exists",
                payload.staff_id, payload.date
            )));
        }

        sqlx::query(
            "INSERT INTO clock_in \
             (clock_in_id, staff_id, staff_name, date, check_in_time, check_out_time, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("clock_in"))
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(payload.date)
        .bind(payload.check_in_time)
        .bind(payload.check_out_time)
        .bind(payload.status)
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
        "create clock-in",
        result,
    )
    .await?;
    Ok(response::ok_empty("clock-in created"))
}

/// Edit a punch pair, then re-aggregate the affected month (pending
/// re-approval) since the underlying facts changed.
#[utoipa::path(
    post,
    path = "/api/clock_in/edit",
    request_body = UpdateClockInRequest,
    responses((status = 200, description = "Punch updated; month re-aggregated")),
    tag = "ClockIn"
)]
pub async fn update_clock_in(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateClockInRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let updated = sqlx::query(
            "UPDATE clock_in SET staff_id = ?, staff_name = ?, date = ?, check_in_time = ?, \
             check_out_time = ?, status = ? WHERE id = ?",
        )
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(payload.date)
        .bind(payload.check_in_time)
        .bind(payload.check_out_time)
        .bind(payload.status)
        .bind(payload.id)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("clock-in {} not found", payload.id)));
        }

        let month = payload.date.format("%Y-%m").to_string();
        let mut conn = pool.acquire().await?;
        attendance::recompute_month(&mut conn, &payload.staff_id, &month, APPROVE_PENDING).await?;
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Attendance,
        "update clock-in",
        result,
    )
    .await?;
    Ok(response::ok_empty("clock-in updated"))
}

#[utoipa::path(
    get,
    path = "/api/clock_in/query/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id, or `all`"), PageQuery),
    responses((status = 200, description = "Clock-ins, newest first")),
    tag = "ClockIn"
)]
pub async fn query_clock_ins(
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

    let count_sql = format!("SELECT COUNT(*) FROM clock_in{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if staff_id != "all" {
        count_q = count_q.bind(&staff_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {CLOCK_IN_COLS} FROM clock_in{where_sql} ORDER BY date DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, ClockIn>(&data_sql);
    if staff_id != "all" {
        data_q = data_q.bind(&staff_id);
    }
    let clock_ins = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(clock_ins, total, ""))
}
