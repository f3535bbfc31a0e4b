use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::recruitment::{
    CANDIDATE_ACCEPTED, CANDIDATE_PENDING, CANDIDATE_REJECTED, Candidate, CreateCandidateRequest,
    CreateRecruitmentRequest, Recruitment, UpdateCandidateRequest, UpdateRecruitmentRequest,
};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::utils::ids::new_id;
use crate::utils::page::{PageQuery, limit_clause};

const RECRUITMENT_COLS: &str =
    "id, recruitment_id, job_name, job_describe, need_num, base_salary, edu_level";

const CANDIDATE_COLS: &str = "id, candidate_id, staff_id, name, job_name, edu_level, major, \
     experience, describe_info, status, phone, email";

#[utoipa::path(
    post,
    path = "/api/recruitment/create",
    request_body = CreateRecruitmentRequest,
    responses((status = 200, description = "Job posting created")),
    tag = "Recruitment"
)]
pub async fn create_recruitment(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateRecruitmentRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        sqlx::query(
            "INSERT INTO recruitment \
             (recruitment_id, job_name, job_describe, need_num, base_salary, edu_level) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("recruitment"))
        .bind(&payload.job_name)
        .bind(&payload.job_describe)
        .bind(payload.need_num)
        .bind(payload.base_salary)
        .bind(&payload.edu_level)
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
        OperationModule::Recruitment,
        "create recruitment",
        result,
    )
    .await?;
    Ok(response::ok_empty("recruitment created"))
}

#[utoipa::path(
    delete,
    path = "/api/recruitment/delete/{recruitment_id}",
    params(("recruitment_id" = String, Path, description = "Recruitment id")),
    responses((status = 200, description = "Job posting removed")),
    tag = "Recruitment"
)]
pub async fn delete_recruitment(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let recruitment_id = path.into_inner();

    let result = async {
        let deleted = sqlx::query("DELETE FROM recruitment WHERE recruitment_id = ?")
            .bind(&recruitment_id)
            .execute(pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "recruitment {recruitment_id} not found"
            )));
        }
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Recruitment,
        "delete recruitment",
        result,
    )
    .await?;
    Ok(response::ok_empty("recruitment deleted"))
}

#[utoipa::path(
    post,
    path = "/api/recruitment/edit",
    request_body = UpdateRecruitmentRequest,
    responses((status = 200, description = "Job posting updated")),
    tag = "Recruitment"
)]
pub async fn update_recruitment(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateRecruitmentRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let updated = sqlx::query(
            "UPDATE recruitment SET job_name = ?, job_describe = ?, need_num = ?, \
             base_salary = ?, edu_level = ? WHERE id = ?",
        )
        .bind(&payload.job_name)
        .bind(&payload.job_describe)
        .bind(payload.need_num)
        .bind(payload.base_salary)
        .bind(&payload.edu_level)
        .bind(payload.id)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "recruitment {} not found",
                payload.id
            )));
        }
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Recruitment,
        "update recruitment",
        result,
    )
    .await?;
    Ok(response::ok_empty("recruitment updated"))
}

#[utoipa::path(
    get,
    path = "/api/recruitment/query/{job_name}",
    params(("job_name" = String, Path, description = "Full or partial job name, or `all`"), PageQuery),
    responses((status = 200, description = "Job postings")),
    tag = "Recruitment"
)]
pub async fn query_recruitments(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let job_name = path.into_inner();
    let (start, limit) = query.window();

    let mut where_sql = String::new();
    if job_name != "all" {
        where_sql.push_str(" WHERE job_name LIKE ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM recruitment{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if job_name != "all" {
        count_q = count_q.bind(format!("%{job_name}%"));
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {RECRUITMENT_COLS} FROM recruitment{where_sql} ORDER BY id DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, Recruitment>(&data_sql);
    if job_name != "all" {
        data_q = data_q.bind(format!("%{job_name}%"));
    }
    let recruitments = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(recruitments, total, ""))
}

#[utoipa::path(
    post,
    path = "/api/candidate/create",
    request_body = CreateCandidateRequest,
    responses((status = 200, description = "Candidate filed, pending decision")),
    tag = "Candidate"
)]
pub async fn create_candidate(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateCandidateRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        sqlx::query(
            "INSERT INTO candidate \
             (candidate_id, staff_id, name, job_name, edu_level, major, experience, \
              describe_info, status, phone, email) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("candidate"))
        .bind(&payload.staff_id)
        .bind(&payload.name)
        .bind(&payload.job_name)
        .bind(&payload.edu_level)
        .bind(&payload.major)
        .bind(&payload.experience)
        .bind(&payload.describe_info)
        .bind(CANDIDATE_PENDING)
        .bind(&payload.phone)
        .bind(&payload.email)
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
        OperationModule::Candidate,
        "create candidate",
        result,
    )
    .await?;
    Ok(response::ok_empty("candidate created"))
}

#[utoipa::path(
    delete,
    path = "/api/candidate/delete/{candidate_id}",
    params(("candidate_id" = String, Path, description = "Candidate id")),
    responses((status = 200, description = "Candidate removed")),
    tag = "Candidate"
)]
pub async fn delete_candidate(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let candidate_id = path.into_inner();

    let result = async {
        let deleted = sqlx::query("DELETE FROM candidate WHERE candidate_id = ?")
            .bind(&candidate_id)
            .execute(pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("candidate {candidate_id} not found")));
        }
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Candidate,
        "delete candidate",
        result,
    )
    .await?;
    Ok(response::ok_empty("candidate deleted"))
}

#[utoipa::path(
    post,
    path = "/api/candidate/edit",
    request_body = UpdateCandidateRequest,
    responses((status = 200, description = "Candidate updated")),
    tag = "Candidate"
)]
pub async fn update_candidate(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateCandidateRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let updated = sqlx::query(
            "UPDATE candidate SET staff_id = ?, name = ?, job_name = ?, edu_level = ?, major = ?, \
             experience = ?, describe_info = ?, phone = ?, email = ? WHERE id = ?",
        )
        .bind(&payload.staff_id)
        .bind(&payload.name)
        .bind(&payload.job_name)
        .bind(&payload.edu_level)
        .bind(&payload.major)
        .bind(&payload.experience)
        .bind(&payload.describe_info)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(payload.id)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("candidate {} not found", payload.id)));
        }
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Candidate,
        "update candidate",
        result,
    )
    .await?;
    Ok(response::ok_empty("candidate updated"))
}

#[utoipa::path(
    get,
    path = "/api/candidate/query_by_name/{name}",
    params(("name" = String, Path, description = "Full or partial candidate name, or `all`"), PageQuery),
    responses((status = 200, description = "Candidates")),
    tag = "Candidate"
)]
pub async fn query_candidates_by_name(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let name = path.into_inner();
    let (start, limit) = query.window();

    let mut where_sql = String::new();
    if name != "all" {
        where_sql.push_str(" WHERE name LIKE ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM candidate{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if name != "all" {
        count_q = count_q.bind(format!("%{name}%"));
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {CANDIDATE_COLS} FROM candidate{where_sql} ORDER BY id DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, Candidate>(&data_sql);
    if name != "all" {
        data_q = data_q.bind(format!("%{name}%"));
    }
    let candidates = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(candidates, total, ""))
}

#[utoipa::path(
    get,
    path = "/api/candidate/query_by_staff_id/{staff_id}",
    params(("staff_id" = String, Path, description = "Referring staff id")),
    responses((status = 200, description = "Candidates filed by the staff member")),
    tag = "Candidate"
)]
pub async fn query_candidates_by_staff(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let staff_id = path.into_inner();

    let sql = format!("SELECT {CANDIDATE_COLS} FROM candidate WHERE staff_id = ? ORDER BY id DESC");
    let candidates = sqlx::query_as::<_, Candidate>(&sql)
        .bind(&staff_id)
        .fetch_all(pool)
        .await?;
    let total = candidates.len() as i64;
    Ok(response::ok_with_total(candidates, total, ""))
}

async fn set_candidate_status(
    pool: &sqlx::MySqlPool,
    id: u64,
    status: i64,
) -> Result<(), AppError> {
    let updated = sqlx::query("UPDATE candidate SET status = ? WHERE id = ? AND status = ?")
        .bind(status)
        .bind(id)
        .bind(CANDIDATE_PENDING)
        .execute(pool)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "candidate {id} not found or already decided"
        )));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/candidate/accept/{id}",
    params(("id" = u64, Path, description = "Candidate row id")),
    responses((status = 200, description = "Candidate accepted")),
    tag = "Candidate"
)]
pub async fn accept_candidate(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = set_candidate_status(pool, path.into_inner(), CANDIDATE_ACCEPTED).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Candidate,
        "accept candidate",
        result,
    )
    .await?;
    Ok(response::ok_empty("candidate accepted"))
}

#[utoipa::path(
    get,
    path = "/api/candidate/reject/{id}",
    params(("id" = u64, Path, description = "Candidate row id")),
    responses((status = 200, description = "Candidate rejected")),
    tag = "Candidate"
)]
pub async fn reject_candidate(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let result = set_candidate_status(pool, path.into_inner(), CANDIDATE_REJECTED).await;
    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Candidate,
        "reject candidate",
        result,
    )
    .await?;
    Ok(response::ok_empty("candidate rejected"))
}
