use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::parameter::{CreateCalculationRuleRequest, UpdateCalculationRuleRequest};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::service::parameter_store;

#[derive(Debug, Deserialize, IntoParams)]
pub struct CalculationRuleQuery {
    pub rule_type: Option<String>,
    pub start: Option<i64>,
    pub limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/v2/calculation/rule/create",
    request_body = CreateCalculationRuleRequest,
    responses((status = 200, description = "Rule created")),
    tag = "Calculation"
)]
pub async fn create_calculation_rule(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateCalculationRuleRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = parameter_store::create_calculation_rule(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Create,
        OperationModule::Parameter,
        "create calculation rule",
        result,
    )
    .await?;
    Ok(response::ok_empty("calculation rule created"))
}

#[utoipa::path(
    get,
    path = "/api/v2/calculation/rule/query",
    params(CalculationRuleQuery),
    responses((status = 200, description = "Active calculation rules")),
    tag = "Calculation"
)]
pub async fn query_calculation_rules(
    session: Session,
    tenants: web::Data<Tenants>,
    query: web::Query<CalculationRuleQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let start = query.start.unwrap_or(0);
    let limit = query.limit.unwrap_or(10);
    let rule_type = query.rule_type.as_deref().filter(|s| !s.is_empty());
    let (rules, total) =
        parameter_store::list_calculation_rules(pool, rule_type, start, limit).await?;
    Ok(response::ok_with_total(rules, total, ""))
}

/// First active rule value of a type; the calculator's defaults cover types
/// with no configured rule.
#[utoipa::path(
    get,
    path = "/api/v2/calculation/rule/value/{rule_type}",
    params(("rule_type" = String, Path, description = "Rule type, e.g. overtime or leave")),
    responses((status = 200, description = "Rule value")),
    tag = "Calculation"
)]
pub async fn get_calculation_rule_value(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let rule_type = path.into_inner();
    let rules = parameter_store::active_rules_by_type(pool, &rule_type).await?;
    let rule = rules.first().ok_or_else(|| {
        AppError::NotFound(format!("no active calculation rules of type {rule_type}"))
    })?;
    Ok(response::ok(
        serde_json::json!({ "rule_type": rule_type, "value": rule.rule_value }),
        "",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v2/calculation/rule/edit",
    request_body = UpdateCalculationRuleRequest,
    responses((status = 200, description = "Rule updated; a history row is appended")),
    tag = "Calculation"
)]
pub async fn update_calculation_rule(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateCalculationRuleRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = parameter_store::update_calculation_rule(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Parameter,
        "update calculation rule",
        result,
    )
    .await?;
    Ok(response::ok_empty("calculation rule updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v2/calculation/rule/delete/{id}",
    params(("id" = u64, Path, description = "Calculation rule row id")),
    responses((status = 200, description = "Rule deactivated")),
    tag = "Calculation"
)]
pub async fn delete_calculation_rule(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result =
        parameter_store::deactivate_calculation_rule(pool, path.into_inner(), &session.staff_id)
            .await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Parameter,
        "delete calculation rule",
        result,
    )
    .await?;
    Ok(response::ok_empty("calculation rule deleted"))
}
