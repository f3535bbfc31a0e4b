use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub const STATUS_PROBATION: i64 = 0;
pub const STATUS_REGULAR: i64 = 1;
pub const STATUS_RESIGNED: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Staff {
    pub id: u64,
    pub staff_id: String,
    pub staff_name: String,
    pub leader_staff_id: Option<String>,
    pub leader_name: Option<String>,
    pub birthday: NaiveDate,
    pub identity_num: String,
    pub sex: i64,
    pub nation: String,
    pub school: String,
    pub major: String,
    pub edu_level: String,
    /// Cents.
    pub base_salary: i64,
    pub card_num: String,
    pub rank_id: String,
    pub dep_id: String,
    pub email: String,
    pub phone: String,
    pub entry_date: NaiveDate,
    /// 0 = probation, 1 = regular, 2 = resigned. Transitions only move
    /// forward, through the explicit lifecycle actions.
    pub status: i64,
    pub probation_end_date: Option<NaiveDate>,
    pub resignation_date: Option<NaiveDate>,
    pub resignation_reason: Option<String>,
}

/// Staff row enriched with resolved department/rank names for display.
#[derive(Debug, Serialize, ToSchema)]
pub struct StaffVo {
    #[serde(flatten)]
    pub staff: Staff,
    pub dep_name: String,
    pub rank_name: String,
}

/// Append-only lifecycle audit row; one per onboarding/promotion/transfer/
/// resignation action, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffLifecycleLog {
    pub id: u64,
    pub staff_id: String,
    pub action_type: String,
    pub old_value: String,
    pub new_value: String,
    pub action_date: NaiveDateTime,
    pub operator: String,
    pub remark: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateStaffRequest {
    pub staff_name: String,
    pub leader_staff_id: Option<String>,
    pub leader_name: Option<String>,
    pub birthday: NaiveDate,
    pub identity_num: String,
    pub sex: i64,
    pub nation: String,
    pub school: String,
    pub major: String,
    pub edu_level: String,
    pub base_salary: i64,
    pub card_num: String,
    pub rank_id: String,
    pub dep_id: String,
    pub email: String,
    pub phone: String,
    pub entry_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStaffRequest {
    pub staff_id: String,
    pub staff_name: String,
    pub leader_staff_id: Option<String>,
    pub leader_name: Option<String>,
    pub birthday: NaiveDate,
    pub identity_num: String,
    pub sex: i64,
    pub nation: String,
    pub school: String,
    pub major: String,
    pub edu_level: String,
    pub base_salary: i64,
    pub card_num: String,
    pub rank_id: String,
    pub dep_id: String,
    pub email: String,
    pub phone: String,
    pub entry_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OnboardStaffRequest {
    pub candidate_id: String,
    #[serde(flatten)]
    pub staff: CreateStaffRequest,
    pub probation_end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PromoteStaffRequest {
    pub staff_id: String,
    pub probation_end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferStaffRequest {
    pub staff_id: String,
    pub dep_id: String,
    pub rank_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResignStaffRequest {
    pub staff_id: String,
    pub resignation_date: Option<NaiveDate>,
    pub resignation_reason: Option<String>,
}
