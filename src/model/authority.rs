use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Login credential + role row for a staff member. `user_password` holds an
/// argon2 hash; the row is never serialized into a response.
#[derive(Debug, Clone, FromRow)]
pub struct Authority {
    pub id: u64,
    pub authority_id: String,
    pub staff_id: String,
    pub user_type: String,
    pub user_password: String,
}

pub const USER_TYPE_SUPER_ADMIN: &str = "supadmin";
pub const USER_TYPE_ADMIN: &str = "admin";
pub const USER_TYPE_NORMAL: &str = "normal";

/// Branch company row, read from the bootstrap database before login.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BranchCompany {
    pub id: u64,
    pub branch_id: String,
    pub company_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub staff_id: String,
    pub password: String,
    pub branch_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    pub staff_id: String,
    pub password: String,
}
