use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use calamine::{Reader, Xlsx};
use chrono::NaiveDate;
use sqlx::MySqlPool;
use tokio::sync::Semaphore;

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::staff::{
    CreateStaffRequest, OnboardStaffRequest, PromoteStaffRequest, ResignStaffRequest, Staff,
    StaffVo, TransferStaffRequest, UpdateStaffRequest,
};
use crate::response::{self, AppError};
use crate::service::lifecycle;
use crate::service::operation_log::logged;
use crate::utils::name_cache;
use crate::utils::page::{PageQuery, limit_clause};

const STAFF_COLS: &str = "id, staff_id, staff_name, leader_staff_id, leader_name, birthday, \
     identity_num, sex, nation, school, major, edu_level, base_salary, card_num, rank_id, dep_id, \
     email, phone, entry_date, status, probation_end_date, resignation_date, resignation_reason";

/// Concurrent row creations during a bulk import.
const IMPORT_CONCURRENCY: usize = 8;

async fn to_vos(pool: &MySqlPool, branch_id: &str, staffs: Vec<Staff>) -> Vec<StaffVo> {
    let mut vos = Vec::with_capacity(staffs.len());
    for staff in staffs {
        let dep_name = name_cache::dep_name(pool, branch_id, &staff.dep_id)
            .await
            .unwrap_or_default();
        let rank_name = name_cache::rank_name(pool, branch_id, &staff.rank_id)
            .await
            .unwrap_or_default();
        vos.push(StaffVo {
            staff,
            dep_name,
            rank_name,
        });
    }
    vos
}

#[utoipa::path(
    post,
    path = "/api/staff/create",
    request_body = CreateStaffRequest,
    responses((status = 200, description = "Staff created with a default normal account")),
    tag = "Staff"
)]
pub async fn create_staff(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateStaffRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = lifecycle::create_staff(pool, &payload).await;
    let staff_id = logged(
        pool,
        &req,
        &session,
        OperationType::Create,
        OperationModule::Staff,
        "create staff",
        result,
    )
    .await?;
    Ok(response::ok(
        serde_json::json!({ "staff_id": staff_id }),
        "staff created",
    ))
}

#[utoipa::path(
    post,
    path = "/api/staff/edit",
    request_body = UpdateStaffRequest,
    responses((status = 200, description = "Staff profile updated")),
    tag = "Staff"
)]
pub async fn update_staff(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateStaffRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let updated = sqlx::query(
            "UPDATE staff SET staff_name = ?, leader_staff_id = ?, leader_name = ?, birthday = ?, \
             identity_num = ?, sex = ?, nation = ?, school = ?, major = ?, edu_level = ?, \
             base_salary = ?, card_num = ?, rank_id = ?, dep_id = ?, email = ?, phone = ?, \
             entry_date = ? WHERE staff_id = ?",
        )
        .bind(&payload.staff_name)
        .bind(&payload.leader_staff_id)
        .bind(&payload.leader_name)
        .bind(payload.birthday)
        .bind(&payload.identity_num)
        .bind(payload.sex)
        .bind(&payload.nation)
        .bind(&payload.school)
        .bind(&payload.major)
        .bind(&payload.edu_level)
        .bind(payload.base_salary)
        .bind(&payload.card_num)
        .bind(&payload.rank_id)
        .bind(&payload.dep_id)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(payload.entry_date)
        .bind(&payload.staff_id)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("staff {} not found", payload.staff_id)));
        }
        name_cache::forget_staff(&session.branch_id, &payload.staff_id).await;
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Staff,
        "update staff",
        result,
    )
    .await?;
    Ok(response::ok_empty("staff updated"))
}

#[utoipa::path(
    delete,
    path = "/api/staff/del/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id")),
    responses((status = 200, description = "Staff and account removed")),
    tag = "Staff"
)]
pub async fn delete_staff(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let staff_id = path.into_inner();

    let result = async {
        let deleted = sqlx::query("DELETE FROM staff WHERE staff_id = ?")
            .bind(&staff_id)
            .execute(pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("staff {staff_id} not found")));
        }
        sqlx::query("DELETE FROM authority WHERE staff_id = ?")
            .bind(&staff_id)
            .execute(pool)
            .await?;
        name_cache::forget_staff(&session.branch_id, &staff_id).await;
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Staff,
        "delete staff",
        result,
    )
    .await?;
    Ok(response::ok_empty("staff deleted"))
}

#[utoipa::path(
    get,
    path = "/api/staff/query/{staff_id}",
    params(("staff_id" = String, Path, description = "Staff id, or `all`"), PageQuery),
    responses((status = 200, description = "Staff profiles with resolved dep/rank names")),
    tag = "Staff"
)]
pub async fn query_staff(
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

    let count_sql = format!("SELECT COUNT(*) FROM staff{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if staff_id != "all" {
        count_q = count_q.bind(&staff_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {STAFF_COLS} FROM staff{where_sql} ORDER BY id DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, Staff>(&data_sql);
    if staff_id != "all" {
        data_q = data_q.bind(&staff_id);
    }
    let staffs = data_q.fetch_all(pool).await?;

    let vos = to_vos(pool, &session.branch_id, staffs).await;
    Ok(response::ok_with_total(vos, total, ""))
}

#[utoipa::path(
    get,
    path = "/api/staff/query_by_name/{staff_name}",
    params(("staff_name" = String, Path, description = "Full or partial staff name")),
    responses((status = 200, description = "Matching staff profiles")),
    tag = "Staff"
)]
pub async fn query_staff_by_name(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let staff_name = path.into_inner();

    let sql = format!("SELECT {STAFF_COLS} FROM staff WHERE staff_name LIKE ? ORDER BY id DESC");
    let staffs = sqlx::query_as::<_, Staff>(&sql)
        .bind(format!("%{staff_name}%"))
        .fetch_all(pool)
        .await?;

    let total = staffs.len() as i64;
    let vos = to_vos(pool, &session.branch_id, staffs).await;
    Ok(response::ok_with_total(vos, total, ""))
}

#[utoipa::path(
    get,
    path = "/api/staff/query_by_dep/{dep_name}",
    params(("dep_name" = String, Path, description = "Department name")),
    responses((status = 200, description = "Staff of the department")),
    tag = "Staff"
)]
pub async fn query_staff_by_dep(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let dep_name = path.into_inner();

    let dep_id = sqlx::query_as::<_, (String,)>("SELECT dep_id FROM department WHERE dep_name = ?")
        .bind(&dep_name)
        .fetch_optional(pool)
        .await?
        .map(|row| row.0)
        .ok_or_else(|| AppError::NotFound(format!("department {dep_name} not found")))?;

    let sql = format!("SELECT {STAFF_COLS} FROM staff WHERE dep_id = ? ORDER BY id DESC");
    let staffs = sqlx::query_as::<_, Staff>(&sql)
        .bind(&dep_id)
        .fetch_all(pool)
        .await?;

    let total = staffs.len() as i64;
    let vos = to_vos(pool, &session.branch_id, staffs).await;
    Ok(response::ok_with_total(vos, total, ""))
}

#[utoipa::path(
    post,
    path = "/api/staff/onboard",
    request_body = OnboardStaffRequest,
    responses((status = 200, description = "Candidate onboarded as probation staff")),
    tag = "Staff"
)]
pub async fn onboard_staff(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<OnboardStaffRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = lifecycle::onboard_staff(pool, &payload, &session.staff_id).await;
    let staff_id = logged(
        pool,
        &req,
        &session,
        OperationType::Create,
        OperationModule::Staff,
        "onboard staff",
        result,
    )
    .await?;
    Ok(response::ok(
        serde_json::json!({ "staff_id": staff_id }),
        "staff onboarded",
    ))
}

#[utoipa::path(
    post,
    path = "/api/staff/promote",
    request_body = PromoteStaffRequest,
    responses((status = 200, description = "Probation ended; staff is regular")),
    tag = "Staff"
)]
pub async fn promote_staff(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<PromoteStaffRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = lifecycle::promote_staff(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Staff,
        "promote staff",
        result,
    )
    .await?;
    Ok(response::ok_empty("staff promoted"))
}

#[utoipa::path(
    post,
    path = "/api/staff/transfer",
    request_body = TransferStaffRequest,
    responses((status = 200, description = "Department/rank transfer applied")),
    tag = "Staff"
)]
pub async fn transfer_staff(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<TransferStaffRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = lifecycle::transfer_staff(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Staff,
        "transfer staff",
        result,
    )
    .await?;
    Ok(response::ok_empty("staff transferred"))
}

#[utoipa::path(
    post,
    path = "/api/staff/resign",
    request_body = ResignStaffRequest,
    responses((status = 200, description = "Staff resigned; terminal status")),
    tag = "Staff"
)]
pub async fn resign_staff(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<ResignStaffRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = lifecycle::resign_staff(pool, &payload, &session.staff_id).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Staff,
        "resign staff",
        result,
    )
    .await?;
    Ok(response::ok_empty("staff resigned"))
}

fn cell_text(raw: String) -> String {
    // numeric cells render as "123.0"; strip the fractional zero
    if let Some(stripped) = raw.strip_suffix(".0") {
        if stripped.chars().all(|c| c.is_ascii_digit()) {
            return stripped.to_string();
        }
    }
    raw.trim().to_string()
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("{field} must be YYYY-MM-DD, got '{value}'"))
}

fn parse_sex(value: &str) -> i64 {
    match value {
        "男" | "1" => 1,
        "女" | "2" => 2,
        _ => 0,
    }
}

fn build_import_row(
    cells: &HashMap<String, String>,
    dep_ids: &HashMap<String, String>,
    rank_ids: &HashMap<String, String>,
) -> Result<CreateStaffRequest, String> {
    let get = |key: &str| cells.get(key).cloned().unwrap_or_default();

    let staff_name = get("员工姓名");
    if staff_name.is_empty() {
        return Err("missing staff name".to_string());
    }
    let dep_name = get("部门");
    let rank_name = get("职位");
    let dep_id = dep_ids
        .get(&dep_name)
        .cloned()
        .ok_or_else(|| format!("unknown department '{dep_name}'"))?;
    let rank_id = rank_ids
        .get(&rank_name)
        .cloned()
        .ok_or_else(|| format!("unknown rank '{rank_name}'"))?;

    let base_salary = get("基本薪资")
        .parse::<i64>()
        .map_err(|_| "base salary must be an integer amount of cents".to_string())?;

    Ok(CreateStaffRequest {
        staff_name,
        leader_staff_id: Some(get("上级工号")).filter(|s| !s.is_empty()),
        leader_name: Some(get("指定上级")).filter(|s| !s.is_empty()),
        birthday: parse_date(&get("出生日期"), "birthday")?,
        identity_num: get("身份证号"),
        sex: parse_sex(&get("员工性别")),
        nation: get("民族"),
        school: get("毕业院校"),
        major: get("毕业专业"),
        edu_level: get("最高学历"),
        base_salary,
        card_num: get("银行卡号"),
        rank_id,
        dep_id,
        email: get("电子邮箱"),
        phone: get("手机号"),
        entry_date: parse_date(&get("入职日期"), "entry date")?,
    })
}

/// Bulk import from a raw `.xlsx` body. Rows are created concurrently under a
/// bounded worker pool; the response reports per-row success/failure counts.
/// Partial success is the normal outcome, not an error.
#[utoipa::path(
    post,
    path = "/api/staff/excel_import",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses((status = 200, description = "Import finished with per-row counts")),
    tag = "Staff"
)]
pub async fn import_staff(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let mut workbook: Xlsx<_> = Xlsx::new(std::io::Cursor::new(body.to_vec()))
            .map_err(|e| AppError::Validation(format!("not a valid xlsx file: {e}")))?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AppError::Validation("workbook has no sheets".to_string()))?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| AppError::Validation(format!("unreadable sheet: {e}")))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| AppError::Validation("sheet is empty".to_string()))?
            .iter()
            .map(|cell| cell_text(cell.to_string()))
            .collect();

        let dep_ids: HashMap<String, String> =
            sqlx::query_as::<_, (String, String)>("SELECT dep_name, dep_id FROM department")
                .fetch_all(pool)
                .await?
                .into_iter()
                .collect();
        let rank_ids: HashMap<String, String> =
            sqlx::query_as::<_, (String, String)>("SELECT rank_name, rank_id FROM `rank`")
                .fetch_all(pool)
                .await?
                .into_iter()
                .collect();

        let mut parsed = Vec::new();
        let mut failed = 0usize;
        for row in rows {
            let cells: HashMap<String, String> = headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| (header.clone(), cell_text(cell.to_string())))
                .collect();
            match build_import_row(&cells, &dep_ids, &rank_ids) {
                Ok(staff) => parsed.push(staff),
                Err(reason) => {
                    failed += 1;
                    tracing::warn!(reason = %reason, "import row rejected");
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(IMPORT_CONCURRENCY));
        let tasks = parsed.into_iter().map(|staff| {
            let pool = pool.clone();
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Computation(e.to_string()))?;
                lifecycle::create_staff(&pool, &staff).await
            }
        });
        let outcomes = futures_util::future::join_all(tasks).await;

        let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
        failed += outcomes.len() - succeeded;
        for outcome in &outcomes {
            if let Err(e) = outcome {
                tracing::warn!(error = %e, "import row failed");
            }
        }

        Ok(serde_json::json!({ "succeeded": succeeded, "failed": failed }))
    }
    .await;

    let counts = logged(
        pool,
        &req,
        &session,
        OperationType::Import,
        OperationModule::Staff,
        "bulk import staff",
        result,
    )
    .await?;
    Ok(response::ok(counts, "import finished"))
}
