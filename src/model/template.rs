use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

/// Named, reusable set of pay components. Scoping lists are JSON-serialized
/// arrays of rank/department ids; an empty list means universally applicable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SalaryTemplate {
    pub id: u64,
    pub template_id: String,
    pub template_name: String,
    pub template_description: Option<String>,
    pub template_type: String,
    pub applicable_rank_ids: String,
    pub applicable_dep_ids: String,
    pub is_active: bool,
    pub created_by: String,
    pub updated_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SalaryTemplateItem {
    pub id: u64,
    pub item_id: String,
    pub template_id: String,
    pub item_name: String,
    pub item_type: String,
    pub calculation_type: String,
    /// Cents; set for fixed items.
    pub amount: Option<i64>,
    /// Percent of the base salary; set for percentage items.
    pub percentage: Option<f64>,
    pub base_field: Option<String>,
    pub sort_order: i64,
    pub is_required: bool,
}

impl SalaryTemplateItem {
    pub fn item_type(&self) -> Option<ItemType> {
        ItemType::from_str(&self.item_type).ok()
    }

    pub fn calculation_type(&self) -> Option<CalculationType> {
        CalculationType::from_str(&self.calculation_type).ok()
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
pub enum ItemType {
    Base,
    Subsidy,
    Bonus,
    Commission,
    Other,
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
pub enum CalculationType {
    Fixed,
    Percentage,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TemplateWithItems {
    #[serde(flatten)]
    pub template: SalaryTemplate,
    pub items: Vec<SalaryTemplateItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TemplateItemRequest {
    pub item_name: String,
    pub item_type: ItemType,
    pub calculation_type: CalculationType,
    pub amount: Option<i64>,
    pub percentage: Option<f64>,
    pub base_field: Option<String>,
    pub sort_order: i64,
    pub is_required: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTemplateRequest {
    pub template_name: String,
    pub template_description: Option<String>,
    pub template_type: String,
    pub applicable_rank_ids: Vec<String>,
    pub applicable_dep_ids: Vec<String>,
    pub items: Vec<TemplateItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTemplateRequest {
    pub template_id: String,
    pub template_name: String,
    pub template_description: Option<String>,
    pub template_type: String,
    pub applicable_rank_ids: Vec<String>,
    pub applicable_dep_ids: Vec<String>,
    pub is_active: bool,
    pub items: Vec<TemplateItemRequest>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TemplateQuery {
    pub template_name: Option<String>,
    pub template_type: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyTemplateRequest {
    pub template_id: String,
    pub staff_id: String,
    /// Cents.
    pub base_salary: i64,
}

/// Aggregated contribution of a template's items. Not persisted; the caller
/// decides whether to copy it into the staff member's pay structure.
#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TemplateAmounts {
    pub base: i64,
    pub subsidy: i64,
    pub bonus: i64,
    pub commission: i64,
    pub other: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleTemplateRequest {
    pub is_active: bool,
}
