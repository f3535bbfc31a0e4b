use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Write-only audit row; recorded by every mutating operation. Best-effort:
/// a failed write is logged and never fails the parent mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OperationLog {
    pub log_id: u64,
    pub staff_id: String,
    pub staff_name: String,
    pub operation_type: String,
    pub operation_module: String,
    pub operation_desc: String,
    pub request_method: String,
    pub request_url: String,
    pub ip_address: String,
    pub user_agent: String,
    /// 1 = success, 0 = failure.
    pub operation_status: i64,
    pub error_message: String,
    pub operation_time: NaiveDateTime,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct OperationLogQuery {
    pub staff_id: Option<String>,
    pub staff_name: Option<String>,
    pub operation_type: Option<String>,
    pub operation_module: Option<String>,
    pub operation_status: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum OperationType {
    Create,
    Update,
    Delete,
    Query,
    Login,
    Logout,
    Import,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum OperationModule {
    Staff,
    Department,
    Rank,
    Attendance,
    Salary,
    Template,
    Parameter,
    Notification,
    Recruitment,
    Candidate,
    Account,
}
