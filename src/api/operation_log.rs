use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::OperationLogQuery;
use crate::response::{self, AppError};
use crate::service::operation_log;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatsQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PurgeRequest {
    /// Delete every log at or before this time, `YYYY-MM-DD HH:MM:SS`.
    pub end_time: String,
}

#[utoipa::path(
    get,
    path = "/api/operation_log/query",
    params(OperationLogQuery),
    responses((status = 200, description = "Audit entries matching the filters")),
    tag = "OperationLog"
)]
pub async fn query_operation_logs(
    session: Session,
    tenants: web::Data<Tenants>,
    query: web::Query<OperationLogQuery>,
) -> Result<HttpResponse, AppError> {
    session.require_admin()?;
    let pool = session.db(&tenants)?;
    let (logs, total) = operation_log::query_logs(pool, &query).await?;
    Ok(response::ok_with_total(logs, total, ""))
}

#[utoipa::path(
    get,
    path = "/api/operation_log/detail/{log_id}",
    params(("log_id" = u64, Path, description = "Audit entry id")),
    responses((status = 200, description = "One audit entry")),
    tag = "OperationLog"
)]
pub async fn get_operation_log(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    session.require_admin()?;
    let pool = session.db(&tenants)?;
    let log = operation_log::get_log(pool, path.into_inner()).await?;
    Ok(response::ok(log, ""))
}

#[utoipa::path(
    get,
    path = "/api/operation_log/stats",
    params(StatsQuery),
    responses((status = 200, description = "Totals plus per-module and per-type counts")),
    tag = "OperationLog"
)]
pub async fn operation_log_stats(
    session: Session,
    tenants: web::Data<Tenants>,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse, AppError> {
    session.require_admin()?;
    let pool = session.db(&tenants)?;
    let stats =
        operation_log::stats(pool, query.start_time.as_deref(), query.end_time.as_deref()).await?;
    Ok(response::ok(stats, ""))
}

#[utoipa::path(
    delete,
    path = "/api/operation_log/delete/{log_id}",
    params(("log_id" = u64, Path, description = "Audit entry id")),
    responses((status = 200, description = "Entry deleted")),
    tag = "OperationLog"
)]
pub async fn delete_operation_log(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    session.require_admin()?;
    let pool = session.db(&tenants)?;
    operation_log::delete_log(pool, path.into_inner()).await?;
    Ok(response::ok_empty("operation log deleted"))
}

/// Retention purge: drop every entry at or before the cutoff.
#[utoipa::path(
    post,
    path = "/api/operation_log/purge",
    request_body = PurgeRequest,
    responses((status = 200, description = "Old entries removed")),
    tag = "OperationLog"
)]
pub async fn purge_operation_logs(
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<PurgeRequest>,
) -> Result<HttpResponse, AppError> {
    session.require_admin()?;
    let pool = session.db(&tenants)?;
    if payload.end_time.is_empty() {
        return Err(AppError::Validation("end_time is required".to_string()));
    }
    let removed = operation_log::delete_logs_before(pool, &payload.end_time).await?;
    Ok(response::ok(serde_json::json!({ "removed": removed }), ""))
}
