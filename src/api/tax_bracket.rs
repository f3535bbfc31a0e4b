use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::parameter::{CreateTaxBracketRequest, UpdateTaxBracketRequest};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::service::parameter_store;
use crate::utils::page::StartLimitQuery;

#[utoipa::path(
    post,
    path = "/api/v2/tax/bracket/create",
    request_body = CreateTaxBracketRequest,
    responses((status = 200, description = "Bracket created")),
    tag = "Tax"
)]
pub async fn create_tax_bracket(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateTaxBracketRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = parameter_store::create_tax_bracket(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Create,
        OperationModule::Parameter,
        "create tax bracket",
        result,
    )
    .await?;
    Ok(response::ok_empty("tax bracket created"))
}

/// Active brackets, lowest range first, converted to major currency units.
#[utoipa::path(
    get,
    path = "/api/v2/tax/bracket/query",
    params(StartLimitQuery),
    responses((status = 200, description = "Active tax brackets")),
    tag = "Tax"
)]
pub async fn query_tax_brackets(
    session: Session,
    tenants: web::Data<Tenants>,
    query: web::Query<StartLimitQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let (start, limit) = query.window();
    let (brackets, total) = parameter_store::list_tax_brackets(pool, start, limit).await?;
    Ok(response::ok_with_total(brackets, total, ""))
}

#[utoipa::path(
    post,
    path = "/api/v2/tax/bracket/edit",
    request_body = UpdateTaxBracketRequest,
    responses((status = 200, description = "Bracket updated; a history row is appended")),
    tag = "Tax"
)]
pub async fn update_tax_bracket(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateTaxBracketRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = parameter_store::update_tax_bracket(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Parameter,
        "update tax bracket",
        result,
    )
    .await?;
    Ok(response::ok_empty("tax bracket updated"))
}

/// Logical delete: the bracket disappears from active listings; its final
/// state is preserved in the history log.
#[utoipa::path(
    delete,
    path = "/api/v2/tax/bracket/delete/{id}",
    params(("id" = u64, Path, description = "Tax bracket row id")),
    responses((status = 200, description = "Bracket deactivated")),
    tag = "Tax"
)]
pub async fn delete_tax_bracket(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = parameter_store::deactivate_tax_bracket(pool, path.into_inner(), &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Parameter,
        "delete tax bracket",
        result,
    )
    .await?;
    Ok(response::ok_empty("tax bracket deleted"))
}
