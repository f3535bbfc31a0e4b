use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::parameter::{CreateSystemParameterRequest, UpdateSystemParameterRequest};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::service::parameter_store;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SystemParameterQuery {
    pub category: Option<String>,
    pub start: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ParameterHistoryQuery {
    pub parameter_type: Option<String>,
    pub parameter_id: Option<String>,
    pub start: Option<i64>,
    pub limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/v2/system/parameter/create",
    request_body = CreateSystemParameterRequest,
    responses((status = 200, description = "Parameter created")),
    tag = "System"
)]
pub async fn create_system_parameter(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateSystemParameterRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = parameter_store::create_system_parameter(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Create,
        OperationModule::Parameter,
        "create system parameter",
        result,
    )
    .await?;
    Ok(response::ok_empty("system parameter created"))
}

#[utoipa::path(
    get,
    path = "/api/v2/system/parameter/query",
    params(SystemParameterQuery),
    responses((status = 200, description = "Active system parameters")),
    tag = "System"
)]
pub async fn query_system_parameters(
    session: Session,
    tenants: web::Data<Tenants>,
    query: web::Query<SystemParameterQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let start = query.start.unwrap_or(0);
    let limit = query.limit.unwrap_or(10);
    let category = query.category.as_deref().filter(|s| !s.is_empty());
    let (parameters, total) =
        parameter_store::list_system_parameters(pool, category, start, limit).await?;
    Ok(response::ok_with_total(parameters, total, ""))
}

/// Read a single parameter's value by key (e.g. `monthly_work_days`).
#[utoipa::path(
    get,
    path = "/api/v2/system/parameter/value/{parameter_key}",
    params(("parameter_key" = String, Path, description = "Parameter key")),
    responses((status = 200, description = "Parameter value")),
    tag = "System"
)]
pub async fn get_system_parameter_value(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let parameter_key = path.into_inner();
    if parameter_key.is_empty() {
        return Err(AppError::Validation("parameter_key is required".to_string()));
    }
    let value = parameter_store::get_system_parameter_value(pool, &parameter_key).await?;
    Ok(response::ok(
        serde_json::json!({ "parameter_key": parameter_key, "value": value }),
        "",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v2/system/parameter/edit",
    request_body = UpdateSystemParameterRequest,
    responses((status = 200, description = "Parameter updated; a history row is appended")),
    tag = "System"
)]
pub async fn update_system_parameter(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateSystemParameterRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = parameter_store::update_system_parameter(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Parameter,
        "update system parameter",
        result,
    )
    .await?;
    Ok(response::ok_empty("system parameter updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v2/system/parameter/delete/{id}",
    params(("id" = u64, Path, description = "System parameter row id")),
    responses((status = 200, description = "Parameter deactivated")),
    tag = "System"
)]
pub async fn delete_system_parameter(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result =
        parameter_store::deactivate_system_parameter(pool, path.into_inner(), &session.staff_id)
            .await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Parameter,
        "delete system parameter",
        result,
    )
    .await?;
    Ok(response::ok_empty("system parameter deleted"))
}

/// Change history across all four parameter kinds, newest first.
#[utoipa::path(
    get,
    path = "/api/v2/history/parameter/query",
    params(ParameterHistoryQuery),
    responses((status = 200, description = "Parameter change history")),
    tag = "System"
)]
pub async fn query_parameter_history(
    session: Session,
    tenants: web::Data<Tenants>,
    query: web::Query<ParameterHistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let start = query.start.unwrap_or(0);
    let limit = query.limit.unwrap_or(10);
    let (history, total) = parameter_store::query_history(
        pool,
        query.parameter_type.as_deref(),
        query.parameter_id.as_deref(),
        start,
        limit,
    )
    .await?;
    Ok(response::ok_with_total(history, total, ""))
}
