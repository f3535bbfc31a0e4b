use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Computed, unpaid. Recomputing over it is allowed.
pub const IS_PAY_COMPUTED: i64 = 1;
/// Paid out. Terminal; no further recompute is permitted.
pub const IS_PAY_PAID: i64 = 2;

/// A staff member's recurring pay structure. All amounts in cents; `fund`
/// marks statutory-insurance enrollment (1 = enrolled).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Salary {
    pub id: u64,
    pub salary_id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub base: i64,
    pub subsidy: i64,
    pub bonus: i64,
    pub commission: i64,
    pub other: i64,
    pub fund: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSalaryRequest {
    pub staff_id: String,
    pub staff_name: String,
    pub base: i64,
    pub subsidy: i64,
    pub bonus: i64,
    pub commission: i64,
    pub other: i64,
    pub fund: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSalaryRequest {
    pub id: u64,
    pub staff_id: String,
    pub staff_name: String,
    pub base: i64,
    pub subsidy: i64,
    pub bonus: i64,
    pub commission: i64,
    pub other: i64,
    pub fund: i64,
}

/// Per-month computed payroll snapshot, keyed by (staff_id, salary_date).
/// Component amounts are cents; deductions and tax keep fractional cents from
/// the rate math, as the payout pipeline rounds only at disbursement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SalaryRecord {
    pub id: u64,
    pub salary_record_id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub base: i64,
    pub subsidy: i64,
    pub bonus: i64,
    pub commission: i64,
    pub overtime: i64,
    pub other: i64,
    pub tax: f64,
    pub pension_insurance: f64,
    pub medical_insurance: f64,
    pub unemployment_insurance: f64,
    pub housing_fund: f64,
    pub total: f64,
    pub is_pay: i64,
    /// Month key, `YYYY-MM`.
    pub salary_date: String,
}
