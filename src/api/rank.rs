use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::operation_log::{OperationModule, OperationType};
use crate::model::rank::{CreateRankRequest, Rank, UpdateRankRequest};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::utils::ids::new_id;
use crate::utils::name_cache;
use crate::utils::page::{PageQuery, limit_clause};

const RANK_COLS: &str = "id, rank_id, rank_name, rank_describe";

#[utoipa::path(
    post,
    path = "/api/rank/create",
    request_body = CreateRankRequest,
    responses((status = 200, description = "Rank created")),
    tag = "Rank"
)]
pub async fn create_rank(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateRankRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM `rank` WHERE rank_name = ?")
                .bind(&payload.rank_name)
                .fetch_one(pool)
                .await?;
        if existing != 0 {
            return Err(AppError::Conflict(format!(
                "rank {} already exists",
                payload.rank_name
            )));
        }

        sqlx::query("INSERT INTO `rank` (rank_id, rank_name, rank_describe) VALUES (?, ?, ?)")
            .bind(new_id("rank"))
            .bind(&payload.rank_name)
            .bind(&payload.rank_describe)
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
        OperationModule::Rank,
        "create rank",
        result,
    )
    .await?;
    Ok(response::ok_empty("rank created"))
}

#[utoipa::path(
    delete,
    path = "/api/rank/del/{rank_id}",
    params(("rank_id" = String, Path, description = "Rank id")),
    responses((status = 200, description = "Rank removed")),
    tag = "Rank"
)]
pub async fn delete_rank(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let rank_id = path.into_inner();

    let result = async {
        let deleted = sqlx::query("DELETE FROM `rank` WHERE rank_id = ?")
            .bind(&rank_id)
            .execute(pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("rank {rank_id} not found")));
        }
        name_cache::forget_rank(&session.branch_id, &rank_id).await;
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Rank,
        "delete rank",
        result,
    )
    .await?;
    Ok(response::ok_empty("rank deleted"))
}

#[utoipa::path(
    post,
    path = "/api/rank/edit",
    request_body = UpdateRankRequest,
    responses((status = 200, description = "Rank updated")),
    tag = "Rank"
)]
pub async fn update_rank(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateRankRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let updated =
            sqlx::query("UPDATE `rank` SET rank_name = ?, rank_describe = ? WHERE rank_id = ?")
                .bind(&payload.rank_name)
                .bind(&payload.rank_describe)
                .bind(&payload.rank_id)
                .execute(pool)
                .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("rank {} not found", payload.rank_id)));
        }
        name_cache::forget_rank(&session.branch_id, &payload.rank_id).await;
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Update,
        OperationModule::Rank,
        "update rank",
        result,
    )
    .await?;
    Ok(response::ok_empty("rank updated"))
}

#[utoipa::path(
    get,
    path = "/api/rank/query/{rank_id}",
    params(("rank_id" = String, Path, description = "Rank id, or `all`"), PageQuery),
    responses((status = 200, description = "Ranks")),
    tag = "Rank"
)]
pub async fn query_ranks(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let rank_id = path.into_inner();
    let (start, limit) = query.window();

    let mut where_sql = String::new();
    if rank_id != "all" {
        where_sql.push_str(" WHERE rank_id = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM `rank`{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if rank_id != "all" {
        count_q = count_q.bind(&rank_id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {RANK_COLS} FROM `rank`{where_sql} ORDER BY id ASC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, Rank>(&data_sql);
    if rank_id != "all" {
        data_q = data_q.bind(&rank_id);
    }
    let ranks = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(ranks, total, ""))
}
