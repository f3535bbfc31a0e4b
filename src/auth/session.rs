use actix_web::{FromRequest, HttpRequest, dev::Payload};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use futures::future::{Ready, ready};
use sqlx::MySqlPool;

use crate::db::Tenants;
use crate::model::authority::{USER_TYPE_ADMIN, USER_TYPE_SUPER_ADMIN};
use crate::response::AppError;

pub const SESSION_COOKIE: &str = "user_cookie";

/// Explicit per-request claims, decoded once from the opaque session cookie
/// `{userType}_{staffId}_{branchId}_{base64(staffName)}` and passed into
/// every service call. The branch id selects the tenant database.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_type: String,
    pub staff_id: String,
    pub branch_id: String,
    pub staff_name: String,
}

impl Session {
    pub fn encode(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.user_type,
            self.staff_id,
            self.branch_id,
            BASE64.encode(self.staff_name.as_bytes())
        )
    }

    pub fn decode(raw: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = raw.split('_').collect();
        if parts.len() != 4 {
            return Err(AppError::Unauthorized("malformed session cookie".to_string()));
        }
        let name_bytes = BASE64
            .decode(parts[3])
            .map_err(|_| AppError::Unauthorized("malformed session cookie".to_string()))?;
        let staff_name = String::from_utf8(name_bytes)
            .map_err(|_| AppError::Unauthorized("malformed session cookie".to_string()))?;
        Ok(Session {
            user_type: parts[0].to_string(),
            staff_id: parts[1].to_string(),
            branch_id: parts[2].to_string(),
            staff_name,
        })
    }

    /// The tenant database this session operates on.
    pub fn db<'a>(&self, tenants: &'a Tenants) -> Result<&'a MySqlPool, AppError> {
        tenants.branch(&self.branch_id)
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == USER_TYPE_ADMIN || self.user_type == USER_TYPE_SUPER_ADMIN
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Unauthorized("admin only".to_string()))
        }
    }
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.cookie(SESSION_COOKIE) {
            Some(cookie) => ready(Session::decode(cookie.value()).map_err(Into::into)),
            None => ready(Err(
                AppError::Unauthorized("login required".to_string()).into()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_round_trips() {
        let session = Session {
            user_type: "admin".to_string(),
            staff_id: "H12f3a".to_string(),
            branch_id: "C001".to_string(),
            staff_name: "张三".to_string(),
        };
        let decoded = Session::decode(&session.encode()).unwrap();
        assert_eq!(decoded.user_type, "admin");
        assert_eq!(decoded.staff_id, "H12f3a");
        assert_eq!(decoded.branch_id, "C001");
        assert_eq!(decoded.staff_name, "张三");
    }

    #[test]
    fn malformed_cookie_is_rejected() {
        assert!(Session::decode("justonefield").is_err());
        assert!(Session::decode("a_b_c_%%%not-base64%%%").is_err());
    }

    #[test]
    fn admin_check_covers_both_admin_types() {
        let mut session = Session {
            user_type: "normal".to_string(),
            staff_id: "H00001".to_string(),
            branch_id: "C001".to_string(),
            staff_name: "x".to_string(),
        };
        assert!(session.require_admin().is_err());
        session.user_type = "supadmin".to_string();
        assert!(session.require_admin().is_ok());
    }
}
