use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;

/// Progressive income-tax bracket. Monetary fields are stored in minor
/// currency units (cents); the list API converts to major units for display.
/// `max_income == 0` marks the open-ended top bracket.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TaxBracket {
    pub id: u64,
    pub tax_bracket_id: String,
    pub min_income: i64,
    pub max_income: i64,
    pub tax_rate: f64,
    pub quick_deduction: i64,
    pub description: Option<String>,
    pub is_active: bool,
    pub effective_date: NaiveDate,
    pub created_by: String,
    pub updated_by: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaxBracketRequest {
    /// Major currency units; persisted as cents.
    pub min_income: f64,
    pub max_income: f64,
    pub tax_rate: f64,
    pub quick_deduction: f64,
    pub description: Option<String>,
    pub effective_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaxBracketRequest {
    pub id: u64,
    pub min_income: f64,
    pub max_income: f64,
    pub tax_rate: f64,
    pub quick_deduction: f64,
    pub description: Option<String>,
    pub is_active: bool,
    pub effective_date: NaiveDate,
}

/// Statutory insurance contribution rate. Employee and employer rates are
/// percentages; min/max base are cents (0 = no constraint).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InsuranceRate {
    pub id: u64,
    pub insurance_rate_id: String,
    pub insurance_type: String,
    pub employee_rate: f64,
    pub employer_rate: f64,
    pub min_base: i64,
    pub max_base: i64,
    pub description: Option<String>,
    pub is_active: bool,
    pub effective_date: NaiveDate,
    pub created_by: String,
    pub updated_by: String,
}

impl InsuranceRate {
    pub fn kind(&self) -> Option<InsuranceType> {
        InsuranceType::from_str(&self.insurance_type).ok()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    Pension,
    Medical,
    Unemployment,
    Housing,
    Injury,
    Maternity,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInsuranceRateRequest {
    pub insurance_type: InsuranceType,
    pub employee_rate: f64,
    pub employer_rate: f64,
    /// Major currency units; persisted as cents.
    pub min_base: f64,
    pub max_base: f64,
    pub description: Option<String>,
    pub effective_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInsuranceRateRequest {
    pub id: u64,
    pub insurance_type: InsuranceType,
    pub employee_rate: f64,
    pub employer_rate: f64,
    pub min_base: f64,
    pub max_base: f64,
    pub description: Option<String>,
    pub is_active: bool,
    pub effective_date: NaiveDate,
}

/// Named calculation rule; `rule_value` is a free numeric knob whose meaning
/// depends on the rule type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CalculationRule {
    pub id: u64,
    pub calculation_rule_id: String,
    pub rule_type: String,
    pub rule_name: String,
    pub rule_value: f64,
    pub rule_description: Option<String>,
    pub is_active: bool,
    pub effective_date: NaiveDate,
    pub created_by: String,
    pub updated_by: String,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Overtime,
    BonusDeduction,
    AttendanceBase,
    TaxThreshold,
    Leave,
}

/// Dispatch target for the rule names the calculator understands. The display
/// names stay in the database; dispatch happens on this enum so a renamed
/// rule degrades to the documented defaults instead of silently changing
/// behavior paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    WeekdayOvertime,
    WeekendOvertime,
    HolidayOvertime,
    LeaveDeduction,
}

impl RuleKind {
    pub fn from_rule_name(name: &str) -> Option<Self> {
        match name {
            "工作日加班计算" => Some(RuleKind::WeekdayOvertime),
            "周末加班计算" => Some(RuleKind::WeekendOvertime),
            "法定节假日加班计算" => Some(RuleKind::HolidayOvertime),
            "事假扣款计算" => Some(RuleKind::LeaveDeduction),
            _ => None,
        }
    }

    pub fn overtime_multiplier(&self) -> Option<f64> {
        match self {
            RuleKind::WeekdayOvertime => Some(1.5),
            RuleKind::WeekendOvertime => Some(2.0),
            RuleKind::HolidayOvertime => Some(3.0),
            RuleKind::LeaveDeduction => None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCalculationRuleRequest {
    pub rule_type: RuleType,
    pub rule_name: String,
    pub rule_value: f64,
    pub rule_description: Option<String>,
    pub effective_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCalculationRuleRequest {
    pub id: u64,
    pub rule_type: RuleType,
    pub rule_name: String,
    pub rule_value: f64,
    pub rule_description: Option<String>,
    pub is_active: bool,
    pub effective_date: NaiveDate,
}

/// Typed key/value configuration row, read by key (e.g. `monthly_work_days`,
/// `tax_threshold`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SystemParameter {
    pub id: u64,
    pub parameter_id: String,
    pub parameter_key: String,
    pub parameter_value: String,
    pub parameter_type: String,
    pub parameter_category: String,
    pub parameter_description: Option<String>,
    pub is_editable: bool,
    pub is_active: bool,
    pub created_by: String,
    pub updated_by: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSystemParameterRequest {
    pub parameter_key: String,
    pub parameter_value: String,
    pub parameter_type: String,
    pub parameter_category: String,
    pub parameter_description: Option<String>,
    pub is_editable: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSystemParameterRequest {
    pub id: u64,
    pub parameter_key: String,
    pub parameter_value: String,
    pub parameter_type: String,
    pub parameter_category: String,
    pub parameter_description: Option<String>,
    pub is_editable: bool,
    pub is_active: bool,
}

/// Append-only change log shared by the four parameter kinds. Never updated
/// or deleted; a deactivation writes a row with an empty `new_value`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ParameterHistory {
    pub id: u64,
    pub history_id: String,
    pub parameter_id: String,
    pub parameter_type: String,
    pub old_value: String,
    pub new_value: String,
    pub change_reason: String,
    pub changed_by: String,
    pub change_date: NaiveDateTime,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum ParameterKind {
    TaxBracket,
    InsuranceRate,
    CalculationRule,
    SystemParameter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insurance_type_round_trips_snake_case() {
        assert_eq!(InsuranceType::Pension.to_string(), "pension");
        assert_eq!(
            InsuranceType::from_str("unemployment").unwrap(),
            InsuranceType::Unemployment
        );
        assert!(InsuranceType::from_str("dental").is_err());
    }

    #[test]
    fn rule_kind_maps_known_display_names() {
        assert_eq!(
            RuleKind::from_rule_name("工作日加班计算"),
            Some(RuleKind::WeekdayOvertime)
        );
        assert_eq!(
            RuleKind::from_rule_name("法定节假日加班计算").and_then(|k| k.overtime_multiplier()),
            Some(3.0)
        );
        assert_eq!(RuleKind::from_rule_name("renamed rule"), None);
    }

    #[test]
    fn parameter_kind_serializes_like_legacy_types() {
        assert_eq!(ParameterKind::TaxBracket.to_string(), "tax_bracket");
        assert_eq!(ParameterKind::SystemParameter.to_string(), "system_parameter");
    }
}
