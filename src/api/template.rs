use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::template::{
    ApplyTemplateRequest, CreateTemplateRequest, TemplateQuery, ToggleTemplateRequest,
    UpdateTemplateRequest,
};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::service::template;

#[utoipa::path(
    post,
    path = "/api/v2/template/create",
    request_body = CreateTemplateRequest,
    responses((status = 200, description = "Template with items created")),
    tag = "Template"
)]
pub async fn create_template(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateTemplateRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = template::create_template(pool, &payload, &session.staff_id).await;
    let template_id = logged(
        pool,
        &req,
        &session,
        OperationType::Create,
        OperationModule::Template,
        "create salary template",
        result,
    )
    .await?;
    Ok(response::ok(
        serde_json::json!({ "template_id": template_id }),
        "template created",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v2/template/update",
    request_body = UpdateTemplateRequest,
    responses((status = 200, description = "Template and items replaced")),
    tag = "Template"
)]
pub async fn update_template(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateTemplateRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = template::update_template(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Template,
        "update salary template",
        result,
    )
    .await?;
    Ok(response::ok_empty("template updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v2/template/delete/{template_id}",
    params(("template_id" = String, Path, description = "Template id")),
    responses((status = 200, description = "Template and items removed")),
    tag = "Template"
)]
pub async fn delete_template(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = template::delete_template(pool, &path.into_inner()).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Template,
        "delete salary template",
        result,
    )
    .await?;
    Ok(response::ok_empty("template deleted"))
}

#[utoipa::path(
    get,
    path = "/api/v2/template/detail/{template_id}",
    params(("template_id" = String, Path, description = "Template id")),
    responses((status = 200, description = "Template with ordered items")),
    tag = "Template"
)]
pub async fn get_template(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let with_items = template::get_template(pool, &path.into_inner()).await?;
    Ok(response::ok(with_items, ""))
}

#[utoipa::path(
    get,
    path = "/api/v2/template/query",
    params(TemplateQuery),
    responses((status = 200, description = "Templates matching the filters")),
    tag = "Template"
)]
pub async fn query_templates(
    session: Session,
    tenants: web::Data<Tenants>,
    query: web::Query<TemplateQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let (templates, total) = template::query_templates(pool, &query).await?;
    Ok(response::ok_with_total(templates, total, ""))
}

/// Evaluate a template against a base salary. Nothing is persisted; the
/// aggregated buckets are returned for the caller to apply.
#[utoipa::path(
    post,
    path = "/api/v2/template/apply",
    request_body = ApplyTemplateRequest,
    responses((status = 200, description = "Aggregated pay buckets")),
    tag = "Template"
)]
pub async fn apply_template(
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<ApplyTemplateRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    if payload.base_salary < 0 {
        return Err(AppError::Validation("base_salary must be non-negative".to_string()));
    }
    let amounts = template::apply_template(pool, &payload.template_id, payload.base_salary).await?;
    Ok(response::ok(amounts, ""))
}

/// Active templates whose rank/department scoping admits the staff member.
#[utoipa::path(
    get,
    path = "/api/v2/template/applicable/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id")),
    responses((status = 200, description = "Applicable templates")),
    tag = "Template"
)]
pub async fn applicable_templates(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let templates = template::applicable_templates(pool, &path.into_inner()).await?;
    Ok(response::ok(templates, ""))
}

#[utoipa::path(
    put,
    path = "/api/v2/template/toggle/{template_id}",
    params(("template_id" = String, Path, description = "Template id")),
    request_body = ToggleTemplateRequest,
    responses((status = 200, description = "Template enabled/disabled")),
    tag = "Template"
)]
pub async fn toggle_template(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
    payload: web::Json<ToggleTemplateRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = template::toggle_status(pool, &path.into_inner(), payload.is_active).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Template,
        "toggle salary template",
        result,
    )
    .await?;
    Ok(response::ok_empty("template status updated"))
}
