use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::department::{CreateDepartmentRequest, Department, UpdateDepartmentRequest};
use crate::model::operation_log::{OperationModule, OperationType};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::utils::ids::new_id;
use crate::utils::name_cache;
use crate::utils::page::{PageQuery, limit_clause};

const DEP_COLS: &str = "id, dep_id, dep_name, dep_describe, parent_dep_id";

#[utoipa::path(
    post,
    path = "/api/depart/create",
    request_body = CreateDepartmentRequest,
    responses((status = 200, description = "Department created")),
    tag = "Department"
)]
pub async fn create_department(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateDepartmentRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM department WHERE dep_name = ?")
                .bind(&payload.dep_name)
                .fetch_one(pool)
                .await?;
        if existing != 0 {
            return Err(AppError::Conflict(format!(
                "department {} already exists",
                payload.dep_name
            )));
        }

        sqlx::query(
            "INSERT INTO department (dep_id, dep_name, dep_describe, parent_dep_id) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(new_id("dep"))
        .bind(&payload.dep_name)
        .bind(&payload.dep_describe)
        .bind(payload.parent_dep_id.as_deref().unwrap_or("0"))
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
        OperationModule::Department,
        "create department",
        result,
    )
    .await?;
    Ok(response::ok_empty("department created"))
}

#[utoipa::path(
    delete,
    path = "/api/depart/del/{dep_id}",
    params(("dep_id" = String, Path, description = "Department id")),
    responses((status = 200, description = "Department removed")),
    tag = "Department"
)]
pub async fn delete_department(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let dep_id = path.into_inner();

    let result = async {
        let deleted = sqlx::query("DELETE FROM department WHERE dep_id = ?")
            .bind(&dep_id)
            .execute(pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("department {dep_id} not found")));
        }
        name_cache::forget_dep(&session.branch_id, &dep_id).await;
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Department,
        "delete department",
        result,
    )
    .await?;
    Ok(response::ok_empty("department deleted"))
}

#[utoipa::path(
    post,
    path = "/api/depart/edit",
    request_body = UpdateDepartmentRequest,
    responses((status = 200, description = "Department updated")),
    tag = "Department"
)]
pub async fn update_department(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateDepartmentRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let updated = sqlx::query(
            "UPDATE department SET dep_name = ?, dep_describe = ?, parent_dep_id = ? \
             WHERE dep_id = ?",
        )
        .bind(&payload.dep_name)
        .bind(&payload.dep_describe)
        .bind(payload.parent_dep_id.as_deref().unwrap_or("0"))
        .bind(&payload.dep_id)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "department {} not found",
                payload.dep_id
            )));
        }
        name_cache::forget_dep(&session.branch_id, &payload.dep_id).await;
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Department,
        "update department",
        result,
    )
    .await?;
    Ok(response::ok_empty("department updated"))
}

#[utoipa::path(
    get,
    path = "/api/depart/query/{dep_id}",
    params(("dep_id" = String, Path, description = "Department id, or `all`"), PageQuery),
    responses((status = 200, description = "Departments")),
    tag = "Department"
)]
pub async fn query_departments(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let dep_id = path.into_inner();
    let (start, limit) = query.window();

    let mut where_sql = String::new();
    if dep_id != "all" {
        where_sql.push_str(" WHERE dep_id = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM department{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if dep_id != "all" {
        count_q = count_q.bind(&dep_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {DEP_COLS} FROM department{where_sql} ORDER BY id ASC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, Department>(&data_sql);
    if dep_id != "all" {
        data_q = data_q.bind(&dep_id);
    }
    let departments = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(departments, total, ""))
}
