use actix_web::{HttpResponse, cookie::Cookie, web};

use crate::auth::password;
use crate::auth::session::{SESSION_COOKIE, Session};
use crate::db::Tenants;
use crate::model::authority::{Authority, LoginRequest, SetPasswordRequest};
use crate::response::{self, AppError, CODE_SUCCESS, Envelope};
use crate::utils::name_cache;

/// Login against the branch's authority table; on success the session cookie
/// `{userType}_{staffId}_{branchId}_{base64(staffName)}` is set.
#[utoipa::path(
    post,
    path = "/api/account/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Envelope; status=false with code 2001 on bad credentials")
    ),
    tag = "Account"
)]
pub async fn login(
    tenants: web::Data<Tenants>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = tenants.branch(&payload.branch_id)?;

    let authority = sqlx::query_as::<_, Authority>(
        "SELECT id, authority_id, staff_id, user_type, user_password FROM authority WHERE staff_id = ?",
    )
    .bind(&payload.staff_id)
    .fetch_optional(pool)
    .await?;

    let Some(authority) = authority else {
        tracing::warn!(staff_id = %payload.staff_id, "login: unknown staff id");
        return Err(AppError::Unauthorized("check fail".to_string()));
    };
    if !password::verify_password(&payload.password, &authority.user_password) {
        tracing::warn!(staff_id = %payload.staff_id, "login: bad password");
        return Err(AppError::Unauthorized("check fail".to_string()));
    }

    let staff_name = name_cache::staff_name(pool, &payload.branch_id, &authority.staff_id)
        .await
        .unwrap_or_default();

    let session = Session {
        user_type: authority.user_type,
        staff_id: authority.staff_id,
        branch_id: payload.branch_id.clone(),
        staff_name,
    };
    tracing::info!(staff_id = %session.staff_id, branch = %session.branch_id, "login success");

    let cookie = Cookie::build(SESSION_COOKIE, session.encode())
        .path("/")
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(Envelope {
        code: CODE_SUCCESS,
        status: true,
        message: "login success".to_string(),
        data: Some(serde_json::json!({
            "user_type": session.user_type,
            "staff_id": session.staff_id,
            "staff_name": session.staff_name,
        })),
        total: None,
    }))
}

#[utoipa::path(
    post,
    path = "/api/account/quit",
    responses((status = 200, description = "Session cookie cleared")),
    tag = "Account"
)]
pub async fn quit() -> Result<HttpResponse, AppError> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    Ok(HttpResponse::Ok().cookie(cookie).json(Envelope::<()> {
        code: CODE_SUCCESS,
        status: true,
        message: "logged out".to_string(),
        data: None,
        total: None,
    }))
}

/// Admin-only password reset for a staff member.
#[utoipa::path(
    post,
    path = "/api/account/password",
    request_body = SetPasswordRequest,
    responses((status = 200, description = "Password updated")),
    tag = "Account"
)]
pub async fn set_password(
    session: Session,
    tenants: web::Data<Tenants>,
    payload: web::Json<SetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    session.require_admin()?;
    let pool = session.db(&tenants)?;

    let hash = password::hash_password(&payload.password)?;
    let result = sqlx::query("UPDATE authority SET user_password = ? WHERE staff_id = ?")
        .bind(&hash)
        .bind(&payload.staff_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "no account for staff {}",
            payload.staff_id
        )));
    }
    Ok(response::ok_empty("password updated"))
}
