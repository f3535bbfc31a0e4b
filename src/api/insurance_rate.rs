use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::parameter::{CreateInsuranceRateRequest, UpdateInsuranceRateRequest};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::service::parameter_store;

#[derive(Debug, Deserialize, IntoParams)]
pub struct InsuranceRateQuery {
    pub insurance_type: Option<String>,
    pub start: Option<i64>,
    pub limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/v2/insurance/rate/create",
    request_body = CreateInsuranceRateRequest,
    responses((status = 200, description = "Rate created")),
    tag = "Insurance"
)]
pub async fn create_insurance_rate(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateInsuranceRateRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = parameter_store::create_insurance_rate(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Create,
        OperationModule::Parameter,
        "create insurance rate",
        result,
    )
    .await?;
    Ok(response::ok_empty("insurance rate created"))
}

/// Active rates, optionally filtered by insurance type, newest first.
#[utoipa::path(
    get,
    path = "/api/v2/insurance/rate/query",
    params(InsuranceRateQuery),
    responses((status = 200, description = "Active insurance rates")),
    tag = "Insurance"
)]
pub async fn query_insurance_rates(
    session: Session,
    tenants: web::Data<Tenants>,
    query: web::Query<InsuranceRateQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let start = query.start.unwrap_or(0);
    let limit = query.limit.unwrap_or(10);
    let insurance_type = query.insurance_type.as_deref().filter(|s| !s.is_empty());
    let (rates, total) =
        parameter_store::list_insurance_rates(pool, insurance_type, start, limit).await?;
    Ok(response::ok_with_total(rates, total, ""))
}

#[utoipa::path(
    post,
    path = "/api/v2/insurance/rate/edit",
    request_body = UpdateInsuranceRateRequest,
    responses((status = 200, description = "Rate updated; a history row is appended")),
    tag = "Insurance"
)]
pub async fn update_insurance_rate(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateInsuranceRateRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = parameter_store::update_insurance_rate(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Parameter,
        "update insurance rate",
        result,
    )
    .await?;
    Ok(response::ok_empty("insurance rate updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v2/insurance/rate/delete/{id}",
    params(("id" = u64, Path, description = "Insurance rate row id")),
    responses((status = 200, description = "Rate deactivated")),
    tag = "Insurance"
)]
pub async fn delete_insurance_rate(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result =
        parameter_store::deactivate_insurance_rate(pool, path.into_inner(), &session.staff_id)
            .await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Parameter,
        "delete insurance rate",
        result,
    )
    .await?;
    Ok(response::ok_empty("insurance rate deleted"))
}
