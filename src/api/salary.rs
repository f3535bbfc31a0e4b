use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::salary::{CreateSalaryRequest, IS_PAY_PAID, Salary, SalaryRecord, UpdateSalaryRequest};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::service::payroll;
use crate::utils::ids::new_id;
use crate::utils::page::{PageQuery, limit_clause};

const SALARY_COLS: &str =
    "id, salary_id, staff_id, staff_name, base, subsidy, bonus, commission, other, fund";

const RECORD_COLS: &str = "id, salary_record_id, staff_id, staff_name, base, subsidy, bonus, \
     commission, overtime, other, tax, pension_insurance, medical_insurance, \
     unemployment_insurance, housing_fund, total, is_pay, salary_date";

/// One pay structure per staff member; a second create is a Conflict.
#[utoipa::path(
    post,
    path = "/api/salary/create",
    request_body = CreateSalaryRequest,
    responses((status = 200, description = "Pay structure created")),
    tag = "Salary"
)]
pub async fn create_salary(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateSalaryRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        if payload.base < 0 {
            return Err(AppError::Validation("base must be non-negative".to_string()));
        }
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM salary WHERE staff_id = ?")
                .bind(&payload.staff_id)
                .fetch_one(pool)
                .await?;
        if existing != 0 {
            return Err(AppError::Conflict(format!(
                "salary for staff {} already exists",
                payload.staff_id
            )));
        }

        sqlx::query(
            "INSERT INTO salary \
             (salary_id, staff_id, staff_name, base, subsidy, bonus, commission, other, fund) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("salary"))
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(payload.base)
        .bind(payload.subsidy)
        .bind(payload.bonus)
        .bind(payload.commission)
        .bind(payload.other)
        .bind(payload.fund)
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
        OperationModule::Salary,
        "create salary",
        result,
    )
    .await?;
    Ok(response::ok_empty("salary created"))
}

#[utoipa::path(
    delete,
    path = "/api/salary/delete/{salary_id}",
    params(("salary_id" = String, Path, description = "Salary id")),
    responses((status = 200, description = "Pay structure deleted")),
    tag = "Salary"
)]
pub async fn delete_salary(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let salary_id = path.into_inner();

    let result = async {
        let deleted = sqlx::query("DELETE FROM salary WHERE salary_id = ?")
            .bind(&salary_id)
            .execute(pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("salary {salary_id} not found")));
        }
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Salary,
        "delete salary",
        result,
    )
    .await?;
    Ok(response::ok_empty("salary deleted"))
}

#[utoipa::path(
    post,
    path = "/api/salary/edit",
    request_body = UpdateSalaryRequest,
    responses((status = 200, description = "Pay structure updated")),
    tag = "Salary"
)]
pub async fn update_salary(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateSalaryRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        if payload.base < 0 {
            return Err(AppError::Validation("base must be non-negative".to_string()));
        }
        let updated = sqlx::query(
            "UPDATE salary SET staff_id = ?, staff_name = ?, base = ?, subsidy = ?, bonus = ?, \
             commission = ?, other = ?, fund = ? WHERE id = ?",
        )
        .bind(&payload.staff_id)
        .bind(&payload.staff_name)
        .bind(payload.base)
        .bind(payload.subsidy)
        .bind(payload.bonus)
        .bind(payload.commission)
        .bind(payload.other)
        .bind(payload.fund)
        .bind(payload.id)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("salary {} not found", payload.id)));
        }
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Salary,
        "update salary",
        result,
    )
    .await?;
    Ok(response::ok_empty("salary updated"))
}

#[utoipa::path(
    get,
    path = "/api/salary/query/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id, or `all`"), PageQuery),
    responses((status = 200, description = "Pay structures")),
    tag = "Salary"
)]
pub async fn query_salaries(
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

    let count_sql = format!("SELECT COUNT(*) FROM salary{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if staff_id != "all" {
        count_q = count_q.bind(&staff_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {SALARY_COLS} FROM salary{where_sql} ORDER BY id DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, Salary>(&data_sql);
    if staff_id != "all" {
        data_q = data_q.bind(&staff_id);
    }
    let salaries = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(salaries, total, ""))
}

#[utoipa::path(
    get,
    path = "/api/salary_record/query/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id, or `all`"), PageQuery),
    responses((status = 200, description = "Computed salary records, newest month first")),
    tag = "SalaryRecord"
)]
pub async fn query_salary_records(
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

    let count_sql = format!("SELECT COUNT(*) FROM salary_record{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if staff_id != "all" {
        count_q = count_q.bind(&staff_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {RECORD_COLS} FROM salary_record{where_sql} ORDER BY salary_date DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, SalaryRecord>(&data_sql);
    if staff_id != "all" {
        data_q = data_q.bind(&staff_id);
    }
    let records = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(records, total, ""))
}

#[utoipa::path(
    get,
    path = "/api/salary_record/get_salary_record_is_pay_by_id/{id}",
    params(("id" = u64, Path, description = "Salary record row id")),
    responses((status = 200, description = "is_pay state (1 computed, 2 paid)")),
    tag = "SalaryRecord"
)]
pub async fn get_salary_record_is_pay(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let id = path.into_inner();
    let is_pay = sqlx::query_scalar::<_, i64>("SELECT is_pay FROM salary_record WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("salary record {id} not found")))?;
    Ok(response::ok(is_pay, ""))
}

/// Pay out a computed record. Terminal: the month can never be recomputed or
/// paid again afterwards.
#[utoipa::path(
    get,
    path = "/api/salary_record/pay_salary_record_by_id/{id}",
    params(("id" = u64, Path, description = "Salary record row id")),
    responses((status = 200, description = "Record marked paid")),
    tag = "SalaryRecord"
)]
pub async fn pay_salary_record(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = payroll::pay_salary_record(pool, path.into_inner()).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Salary,
        "pay salary record",
        result,
    )
    .await?;
    Ok(response::ok_empty("salary paid"))
}

#[utoipa::path(
    get,
    path = "/api/salary_record/query_history/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id, or `all`"), PageQuery),
    responses((status = 200, description = "Paid salary records")),
    tag = "SalaryRecord"
)]
pub async fn query_paid_salary_records(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let staff_id = path.into_inner();
    let (start, limit) = query.window();

    let mut where_sql = String::from(" WHERE is_pay = ?");
    if staff_id != "all" {
        where_sql.push_str(" AND staff_id = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM salary_record{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(IS_PAY_PAID);
    if staff_id != "all" {
        count_q = count_q.bind(&staff_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {RECORD_COLS} FROM salary_record{where_sql} ORDER BY salary_date DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, SalaryRecord>(&data_sql).bind(IS_PAY_PAID);
    if staff_id != "all" {
        data_q = data_q.bind(&staff_id);
    }
    let records = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(records, total, ""))
}
