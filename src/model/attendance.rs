use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub const APPROVE_PENDING: i64 = 0;
pub const APPROVE_ACCEPTED: i64 = 1;
pub const APPROVE_REJECTED: i64 = 2;

/// One row per staff per month; `date` is the `YYYY-MM` month key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub attendance_id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub date: String,
    pub work_days: i64,
    pub leave_days: i64,
    pub overtime_days: i64,
    pub approve: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAttendanceRecordRequest {
    pub staff_id: String,
    pub staff_name: String,
    /// Month key, `YYYY-MM`.
    pub date: String,
    pub work_days: i64,
    pub leave_days: i64,
    pub overtime_days: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAttendanceRecordRequest {
    pub id: u64,
    pub staff_id: String,
    pub staff_name: String,
    pub date: String,
    pub work_days: i64,
    pub leave_days: i64,
    pub overtime_days: i64,
}

/// Raw daily punch pair; source data for the monthly aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClockIn {
    pub id: u64,
    pub clock_in_id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = "time", example = "09:00:00")]
    pub check_in_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time", example = "18:00:00")]
    pub check_out_time: Option<NaiveTime>,
    pub status: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClockInRequest {
    pub staff_id: String,
    pub staff_name: String,
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = "time", example = "09:00:00")]
    pub check_in_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time", example = "18:00:00")]
    pub check_out_time: Option<NaiveTime>,
    pub status: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateClockInRequest {
    pub id: u64,
    pub staff_id: String,
    pub staff_name: String,
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = "time", example = "09:00:00")]
    pub check_in_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time", example = "18:00:00")]
    pub check_out_time: Option<NaiveTime>,
    pub status: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: u64,
    pub leave_id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub reason: Option<String>,
    pub approve_status: i64,
    pub approver_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeaveRequestRequest {
    pub staff_id: String,
    pub staff_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLeaveRequestRequest {
    pub id: u64,
    pub staff_id: String,
    pub staff_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub reason: Option<String>,
}

/// Punch-correction request; on acceptance the requested time is written into
/// the day's clock-in row and the month is re-aggregated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PunchRequest {
    pub id: u64,
    pub punch_id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub date: NaiveDate,
    #[schema(value_type = String, format = "time", example = "09:00:00")]
    pub requested_time: NaiveTime,
    pub reason: Option<String>,
    pub approve_status: i64,
    pub approver_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePunchRequestRequest {
    pub staff_id: String,
    pub staff_name: String,
    pub date: NaiveDate,
    #[schema(value_type = String, format = "time", example = "09:00:00")]
    pub requested_time: NaiveTime,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePunchRequestRequest {
    pub id: u64,
    pub staff_id: String,
    pub staff_name: String,
    pub date: NaiveDate,
    #[schema(value_type = String, format = "time", example = "09:00:00")]
    pub requested_time: NaiveTime,
    pub reason: Option<String>,
}
