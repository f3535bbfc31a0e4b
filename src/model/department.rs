use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: u64,
    pub dep_id: String,
    pub dep_name: String,
    pub dep_describe: String,
    /// `0` marks a top-level department.
    pub parent_dep_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDepartmentRequest {
    pub dep_name: String,
    pub dep_describe: String,
    #[serde(default)]
    pub parent_dep_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDepartmentRequest {
    pub dep_id: String,
    pub dep_name: String,
    pub dep_describe: String,
    #[serde(default)]
    pub parent_dep_id: Option<String>,
}
