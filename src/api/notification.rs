use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Local;

use crate::auth::session::Session;
use crate::db::Tenants;
use crate::model::notification::{CreateNotificationRequest, Notification, UpdateNotificationRequest};
use crate::model::operation_log::{OperationModule, OperationType};
use crate::response::{self, AppError};
use crate::service::operation_log::logged;
use crate::utils::ids::new_id;
use crate::utils::page::{PageQuery, limit_clause};

const NOTICE_COLS: &str =
    "id, notice_id, notice_title, notice_content, type AS notice_type, status, date";

#[utoipa::path(
    post,
    path = "/api/notification/create",
    request_body = CreateNotificationRequest,
    responses((status = 200, description = "Notification published")),
    tag = "Notification"
)]
pub async fn create_notification(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<CreateNotificationRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        sqlx::query(
            "INSERT INTO notification (notice_id, notice_title, notice_content, type, status, date) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("notice"))
        .bind(&payload.notice_title)
        .bind(&payload.notice_content)
        .bind(&payload.notice_type)
        .bind(&payload.status)
        .bind(Local::now().naive_local())
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
        OperationModule::Notification,
        "create notification",
        result,
    )
    .await?;
    Ok(response::ok_empty("notification created"))
}

#[utoipa::path(
    delete,
    path = "/api/notification/delete/{notice_id}",
    params(("notice_id" = String, Path, description = "Notification id")),
    responses((status = 200, description = "Notification removed")),
    tag = "Notification"
)]
pub async fn delete_notification(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let notice_id = path.into_inner();

    let result = async {
        let deleted = sqlx::query("DELETE FROM notification WHERE notice_id = ?")
            .bind(&notice_id)
            .execute(pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("notification {notice_id} not found")));
        }
        Ok(())
    }
    .await;

    logged(
        pool,
        &req,
        &session,
        OperationType::Delete,
        OperationModule::Notification,
        "delete notification",
        result,
    )
    .await?;
    Ok(response::ok_empty("notification deleted"))
}

#[utoipa::path(
    post,
    path = "/api/notification/edit",
    request_body = UpdateNotificationRequest,
    responses((status = 200, description = "Notification updated")),
    tag = "Notification"
)]
pub async fn update_notification(
    req: HttpRequest,
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<UpdateNotificationRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;

    let result = async {
        let updated = sqlx::query(
            "UPDATE notification SET notice_title = ?, notice_content = ?, type = ?, status = ? \
             WHERE id = ?",
        )
        .bind(&payload.notice_title)
        .bind(&payload.notice_content)
        .bind(&payload.notice_type)
        .bind(&payload.status)
        .bind(payload.id)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "notification {} not found",
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
        OperationModule::Notification,
        "update notification",
        result,
    )
    .await?;
    Ok(response::ok_empty("notification updated"))
}

#[utoipa::path(
    get,
    path = "/api/notification/query/{notice_title}",
    params(("notice_title" = String, Path, description = "Full or partial title, or `all`"), PageQuery),
    responses((status = 200, description = "Notifications, newest first")),
    tag = "Notification"
)]
pub async fn query_notifications(
    session: Session,
    tenants: web::Data<Tenants>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let pool = session.db(&tenants)?;
    let notice_title = path.into_inner();
    let (start, limit) = query.window();

    let mut where_sql = String::new();
    if notice_title != "all" {
        where_sql.push_str(" WHERE notice_title LIKE ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM notification{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if notice_title != "all" {
        count_q = count_q.bind(format!("%{notice_title}%"));
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {NOTICE_COLS} FROM notification{where_sql} ORDER BY date DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, Notification>(&data_sql);
    if notice_title != "all" {
        data_q = data_q.bind(format!("%{notice_title}%"));
    }
    let notifications = data_q.fetch_all(pool).await?;

    Ok(response::ok_with_total(notifications, total, ""))
}
