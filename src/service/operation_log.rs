//! Write-only audit sink. Every mutating handler records who did what; the
//! write is best-effort and never fails the parent operation.

use actix_web::HttpRequest;
use chrono::Local;
use sqlx::MySqlPool;

use crate::auth::session::Session;
use crate::model::operation_log::{OperationLog, OperationLogQuery, OperationModule, OperationType};
use crate::response::AppError;
use crate::utils::page::{PageQuery, limit_clause};

const LOG_COLS: &str = "log_id, staff_id, staff_name, operation_type, operation_module, \
     operation_desc, request_method, request_url, ip_address, user_agent, operation_status, \
     error_message, operation_time";

enum FilterValue {
    Str(String),
    I64(i64),
}

#[allow(clippy::too_many_arguments)]
async fn write_log(
    pool: &MySqlPool,
    request: &HttpRequest,
    session: &Session,
    operation_type: OperationType,
    module: OperationModule,
    description: &str,
    operation_status: i64,
    error_message: &str,
) {
    let ip_address = request
        .connection_info()
        .realip_remote_addr()
        .unwrap_or_default()
        .to_string();
    let user_agent = request
        .headers()
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let result = sqlx::query(
        "INSERT INTO operation_log \
         (staff_id, staff_name, operation_type, operation_module, operation_desc, \
          request_method, request_url, ip_address, user_agent, operation_status, \
          error_message, operation_time) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&session.staff_id)
    .bind(&session.staff_name)
    .bind(operation_type.as_ref())
    .bind(module.as_ref())
    .bind(description)
    .bind(request.method().as_str())
    .bind(request.uri().to_string())
    .bind(&ip_address)
    .bind(&user_agent)
    .bind(operation_status)
    .bind(error_message)
    .bind(Local::now().naive_local())
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, "operation log write failed");
    }
}

pub async fn log_success(
    pool: &MySqlPool,
    request: &HttpRequest,
    session: &Session,
    operation_type: OperationType,
    module: OperationModule,
    description: &str,
) {
    write_log(pool, request, session, operation_type, module, description, 1, "").await;
}

#[allow(clippy::too_many_arguments)]
pub async fn log_failure(
    pool: &MySqlPool,
    request: &HttpRequest,
    session: &Session,
    operation_type: OperationType,
    module: OperationModule,
    description: &str,
    error_message: &str,
) {
    write_log(
        pool,
        request,
        session,
        operation_type,
        module,
        description,
        0,
        error_message,
    )
    .await;
}

/// Record the outcome of a mutating operation and hand the result back.
/// Success and failure both produce one audit row; failures are also traced.
#[allow(clippy::too_many_arguments)]
pub async fn logged<T>(
    pool: &MySqlPool,
    request: &HttpRequest,
    session: &Session,
    operation_type: OperationType,
    module: OperationModule,
    description: &str,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match &result {
        Ok(_) => log_success(pool, request, session, operation_type, module, description).await,
        Err(e) => {
            tracing::error!(error = %e, "{description} failed");
            log_failure(
                pool,
                request,
                session,
                operation_type,
                module,
                description,
                &e.to_string(),
            )
            .await;
        }
    }
    result
}

pub async fn query_logs(
    pool: &MySqlPool,
    query: &OperationLogQuery,
) -> Result<(Vec<OperationLog>, i64), AppError> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<FilterValue> = Vec::new();

    if let Some(staff_id) = query.staff_id.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND staff_id = ?");
        binds.push(FilterValue::Str(staff_id.to_string()));
    }
    if let Some(name) = query.staff_name.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND staff_name LIKE ?");
        binds.push(FilterValue::Str(format!("%{name}%")));
    }
    if let Some(t) = query.operation_type.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND operation_type = ?");
        binds.push(FilterValue::Str(t.to_string()));
    }
    if let Some(m) = query.operation_module.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND operation_module = ?");
        binds.push(FilterValue::Str(m.to_string()));
    }
    if let Some(status) = query.operation_status {
        where_sql.push_str(" AND operation_status = ?");
        binds.push(FilterValue::I64(status));
    }
    if let Some(start) = query.start_time.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND operation_time >= ?");
        binds.push(FilterValue::Str(start.to_string()));
    }
    if let Some(end) = query.end_time.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND operation_time <= ?");
        binds.push(FilterValue::Str(end.to_string()));
    }

    let count_sql = format!("SELECT COUNT(*) FROM operation_log{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_q = match bind {
            FilterValue::Str(s) => count_q.bind(s),
            FilterValue::I64(v) => count_q.bind(v),
        };
    }
    let total = count_q.fetch_one(pool).await?;

    let (start, limit) = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .window();
    let data_sql = format!(
        "SELECT {LOG_COLS} FROM operation_log{where_sql} ORDER BY operation_time DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, OperationLog>(&data_sql);
    for bind in &binds {
        data_q = match bind {
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::I64(v) => data_q.bind(v),
        };
    }
    let logs = data_q.fetch_all(pool).await?;

    Ok((logs, total))
}

pub async fn get_log(pool: &MySqlPool, log_id: u64) -> Result<OperationLog, AppError> {
    let sql = format!("SELECT {LOG_COLS} FROM operation_log WHERE log_id = ?");
    sqlx::query_as::<_, OperationLog>(&sql)
        .bind(log_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("operation log {log_id} not found")))
}

pub async fn delete_log(pool: &MySqlPool, log_id: u64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM operation_log WHERE log_id = ?")
        .bind(log_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("operation log {log_id} not found")));
    }
    Ok(())
}

pub async fn delete_logs_before(pool: &MySqlPool, end_time: &str) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM operation_log WHERE operation_time <= ?")
        .bind(end_time)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn stats(
    pool: &MySqlPool,
    start_time: Option<&str>,
    end_time: Option<&str>,
) -> Result<serde_json::Value, AppError> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();
    if let Some(start) = start_time.filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND operation_time >= ?");
        binds.push(start.to_string());
    }
    if let Some(end) = end_time.filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND operation_time <= ?");
        binds.push(end.to_string());
    }

    let total_sql = format!("SELECT COUNT(*) FROM operation_log{where_sql}");
    let mut total_q = sqlx::query_scalar::<_, i64>(&total_sql);
    for b in &binds {
        total_q = total_q.bind(b);
    }
    let total_logs = total_q.fetch_one(pool).await?;

    let success_sql =
        format!("SELECT COUNT(*) FROM operation_log{where_sql} AND operation_status = 1");
    let mut success_q = sqlx::query_scalar::<_, i64>(&success_sql);
    for b in &binds {
        success_q = success_q.bind(b);
    }
    let success_logs = success_q.fetch_one(pool).await?;

    let module_sql = format!(
        "SELECT operation_module, COUNT(*) FROM operation_log{where_sql} GROUP BY operation_module"
    );
    let mut module_q = sqlx::query_as::<_, (String, i64)>(&module_sql);
    for b in &binds {
        module_q = module_q.bind(b);
    }
    let module_counts: Vec<serde_json::Value> = module_q
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|(module, count)| serde_json::json!({ "module": module, "count": count }))
        .collect();

    let type_sql = format!(
        "SELECT operation_type, COUNT(*) FROM operation_log{where_sql} GROUP BY operation_type"
    );
    let mut type_q = sqlx::query_as::<_, (String, i64)>(&type_sql);
    for b in &binds {
        type_q = type_q.bind(b);
    }
    let type_counts: Vec<serde_json::Value> = type_q
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|(operation_type, count)| {
            serde_json::json!({ "type": operation_type, "count": count })
        })
        .collect();

    Ok(serde_json::json!({
        "total_logs": total_logs,
        "success_logs": success_logs,
        "failed_logs": total_logs - success_logs,
        "module_counts": module_counts,
        "type_counts": type_counts,
    }))
}
