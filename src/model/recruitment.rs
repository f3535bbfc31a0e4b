use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Recruitment {
    pub id: u64,
    pub recruitment_id: String,
    pub job_name: String,
    pub job_describe: String,
    pub need_num: i64,
    /// Cents.
    pub base_salary: i64,
    pub edu_level: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRecruitmentRequest {
    pub job_name: String,
    pub job_describe: String,
    pub need_num: i64,
    pub base_salary: i64,
    pub edu_level: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRecruitmentRequest {
    pub id: u64,
    pub job_name: String,
    pub job_describe: String,
    pub need_num: i64,
    pub base_salary: i64,
    pub edu_level: String,
}

pub const CANDIDATE_PENDING: i64 = 0;
pub const CANDIDATE_ACCEPTED: i64 = 1;
pub const CANDIDATE_REJECTED: i64 = 2;

/// Applicant for a recruitment posting; `staff_id` is the referring staff
/// member who filed the candidate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Candidate {
    pub id: u64,
    pub candidate_id: String,
    pub staff_id: String,
    pub name: String,
    pub job_name: String,
    pub edu_level: String,
    pub major: String,
    pub experience: String,
    pub describe_info: String,
    pub status: i64,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCandidateRequest {
    pub staff_id: String,
    pub name: String,
    pub job_name: String,
    pub edu_level: String,
    pub major: String,
    pub experience: String,
    pub describe_info: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCandidateRequest {
    pub id: u64,
    pub staff_id: String,
    pub name: String,
    pub job_name: String,
    pub edu_level: String,
    pub major: String,
    pub experience: String,
    pub describe_info: String,
    pub phone: String,
    pub email: String,
}
