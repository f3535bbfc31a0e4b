//! CRUD + soft-deactivation for the four payroll configuration kinds, each
//! versioned through the shared append-only parameter history log.
//!
//! Monetary fields cross this boundary in major currency units and are
//! persisted in cents (×100 in, ÷100 out on listings). The payroll calculator
//! reads the raw stored rows instead so all of its comparisons stay in cents.

use chrono::Local;
use sqlx::MySqlPool;

use crate::model::parameter::{
    CalculationRule, CreateCalculationRuleRequest, CreateInsuranceRateRequest,
    CreateSystemParameterRequest, CreateTaxBracketRequest, InsuranceRate, ParameterHistory,
    ParameterKind, SystemParameter, TaxBracket, UpdateCalculationRuleRequest,
    UpdateInsuranceRateRequest, UpdateSystemParameterRequest, UpdateTaxBracketRequest,
};
use crate::response::AppError;
use crate::utils::ids::new_id;
use crate::utils::page::limit_clause;

fn to_cents(major: f64) -> i64 {
    (major * 100.0) as i64
}

/// Append one history row for a parameter mutation. Best-effort by design:
/// a failed audit write is logged and never fails the parent mutation.
pub async fn record_history(
    pool: &MySqlPool,
    parameter_id: &str,
    kind: ParameterKind,
    old_value: &str,
    new_value: &str,
    change_reason: &str,
    changed_by: &str,
) {
    let result = sqlx::query(
        "INSERT INTO salary_v2_parameter_history \
         (history_id, parameter_id, parameter_type, old_value, new_value, change_reason, changed_by, change_date) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new_id("history"))
    .bind(parameter_id)
    .bind(kind.to_string())
    .bind(old_value)
    .bind(new_value)
    .bind(change_reason)
    .bind(changed_by)
    .bind(Local::now().naive_local())
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, parameter_id, "parameter history write failed");
    }
}

pub async fn query_history(
    pool: &MySqlPool,
    parameter_type: Option<&str>,
    parameter_id: Option<&str>,
    start: i64,
    limit: i64,
) -> Result<(Vec<ParameterHistory>, i64), AppError> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();
    if let Some(t) = parameter_type.filter(|t| !t.is_empty()) {
        where_sql.push_str(" AND parameter_type = ?");
        binds.push(t.to_string());
    }
    if let Some(id) = parameter_id.filter(|id| !id.is_empty()) {
        where_sql.push_str(" AND parameter_id = ?");
        binds.push(id.to_string());
    }

    let count_sql = format!("SELECT COUNT(*) FROM salary_v2_parameter_history{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &binds {
        count_q = count_q.bind(b);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT id, history_id, parameter_id, parameter_type, old_value, new_value, \
         change_reason, changed_by, change_date \
         FROM salary_v2_parameter_history{where_sql} ORDER BY change_date DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, ParameterHistory>(&data_sql);
    for b in &binds {
        data_q = data_q.bind(b);
    }
    let rows = data_q.fetch_all(pool).await?;

    Ok((rows, total))
}

// ---------------------------------------------------------------------------
// Tax brackets
// ---------------------------------------------------------------------------

const TAX_BRACKET_COLS: &str = "id, tax_bracket_id, min_income, max_income, tax_rate, \
     quick_deduction, description, is_active, effective_date, created_by, updated_by";

pub async fn create_tax_bracket(
    pool: &MySqlPool,
    req: &CreateTaxBracketRequest,
    created_by: &str,
) -> Result<String, AppError> {
    if req.min_income < 0.0 || req.max_income < 0.0 || req.quick_deduction < 0.0 {
        return Err(AppError::Validation("monetary fields must be non-negative".to_string()));
    }
    let tax_bracket_id = new_id("tax_bracket");
    sqlx::query(
        "INSERT INTO salary_v2_tax_brackets \
         (tax_bracket_id, min_income, max_income, tax_rate, quick_deduction, description, \
          is_active, effective_date, created_by, updated_by) \
         VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?, ?)",
    )
    .bind(&tax_bracket_id)
    .bind(to_cents(req.min_income))
    .bind(to_cents(req.max_income))
    .bind(req.tax_rate)
    .bind(to_cents(req.quick_deduction))
    .bind(&req.description)
    .bind(req.effective_date)
    .bind(created_by)
    .bind(created_by)
    .execute(pool)
    .await?;
    Ok(tax_bracket_id)
}

/// Active brackets ordered by lower bound, converted to major units.
pub async fn list_tax_brackets(
    pool: &MySqlPool,
    start: i64,
    limit: i64,
) -> Result<(Vec<TaxBracket>, i64), AppError> {
    let sql = format!(
        "SELECT {TAX_BRACKET_COLS} FROM salary_v2_tax_brackets \
         WHERE is_active = 1 ORDER BY min_income ASC{}",
        limit_clause(start, limit)
    );
    let mut rows = sqlx::query_as::<_, TaxBracket>(&sql).fetch_all(pool).await?;
    for bracket in &mut rows {
        bracket.min_income /= 100;
        if bracket.max_income > 0 {
            bracket.max_income /= 100;
        }
        bracket.quick_deduction /= 100;
    }
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM salary_v2_tax_brackets WHERE is_active = 1",
    )
    .fetch_one(pool)
    .await?;
    Ok((rows, total))
}

/// Raw stored rows (cents) for the calculator.
pub async fn active_tax_brackets(pool: &MySqlPool) -> Result<Vec<TaxBracket>, AppError> {
    let sql = format!(
        "SELECT {TAX_BRACKET_COLS} FROM salary_v2_tax_brackets \
         WHERE is_active = 1 ORDER BY min_income ASC"
    );
    Ok(sqlx::query_as::<_, TaxBracket>(&sql).fetch_all(pool).await?)
}

pub async fn update_tax_bracket(
    pool: &MySqlPool,
    req: &UpdateTaxBracketRequest,
    updated_by: &str,
) -> Result<(), AppError> {
    let sql = format!("SELECT {TAX_BRACKET_COLS} FROM salary_v2_tax_brackets WHERE id = ?");
    let old = sqlx::query_as::<_, TaxBracket>(&sql)
        .bind(req.id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tax bracket {} not found", req.id)))?;

    let mut updated = old.clone();
    updated.min_income = to_cents(req.min_income);
    updated.max_income = to_cents(req.max_income);
    updated.tax_rate = req.tax_rate;
    updated.quick_deduction = to_cents(req.quick_deduction);
    updated.description = req.description.clone();
    updated.is_active = req.is_active;
    updated.effective_date = req.effective_date;
    updated.updated_by = updated_by.to_string();

    sqlx::query(
        "UPDATE salary_v2_tax_brackets SET min_income = ?, max_income = ?, tax_rate = ?, \
         quick_deduction = ?, description = ?, is_active = ?, effective_date = ?, updated_by = ? \
         WHERE id = ?",
    )
    .bind(updated.min_income)
    .bind(updated.max_income)
    .bind(updated.tax_rate)
    .bind(updated.quick_deduction)
    .bind(&updated.description)
    .bind(updated.is_active)
    .bind(updated.effective_date)
    .bind(updated_by)
    .bind(req.id)
    .execute(pool)
    .await?;

    let old_value = serde_json::to_string(&old).unwrap_or_default();
    let new_value = serde_json::to_string(&updated).unwrap_or_default();
    record_history(
        pool,
        &old.tax_bracket_id,
        ParameterKind::TaxBracket,
        &old_value,
        &new_value,
        "Tax bracket updated",
        updated_by,
    )
    .await;

    Ok(())
}

pub async fn deactivate_tax_bracket(
    pool: &MySqlPool,
    id: u64,
    deleted_by: &str,
) -> Result<(), AppError> {
    let sql = format!("SELECT {TAX_BRACKET_COLS} FROM salary_v2_tax_brackets WHERE id = ?");
    let old = sqlx::query_as::<_, TaxBracket>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tax bracket {id} not found")))?;

    sqlx::query("UPDATE salary_v2_tax_brackets SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let old_value = serde_json::to_string(&old).unwrap_or_default();
    record_history(
        pool,
        &old.tax_bracket_id,
        ParameterKind::TaxBracket,
        &old_value,
        "",
        "Tax bracket deleted",
        deleted_by,
    )
    .await;

    Ok(())
}

// ---------------------------------------------------------------------------
// Insurance rates
// ---------------------------------------------------------------------------

const INSURANCE_RATE_COLS: &str = "id, insurance_rate_id, insurance_type, employee_rate, \
     employer_rate, min_base, max_base, description, is_active, effective_date, created_by, updated_by";

pub async fn create_insurance_rate(
    pool: &MySqlPool,
    req: &CreateInsuranceRateRequest,
    created_by: &str,
) -> Result<String, AppError> {
    if req.employee_rate < 0.0 || req.employer_rate < 0.0 {
        return Err(AppError::Validation("rates must be non-negative".to_string()));
    }
    let insurance_rate_id = new_id("insurance_rate");
    sqlx::query(
        "INSERT INTO salary_v2_insurance_rates \
         (insurance_rate_id, insurance_type, employee_rate, employer_rate, min_base, max_base, \
          description, is_active, effective_date, created_by, updated_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)",
    )
    .bind(&insurance_rate_id)
    .bind(req.insurance_type.to_string())
    .bind(req.employee_rate)
    .bind(req.employer_rate)
    .bind(if req.min_base > 0.0 { to_cents(req.min_base) } else { 0 })
    .bind(if req.max_base > 0.0 { to_cents(req.max_base) } else { 0 })
    .bind(&req.description)
    .bind(req.effective_date)
    .bind(created_by)
    .bind(created_by)
    .execute(pool)
    .await?;
    Ok(insurance_rate_id)
}

pub async fn list_insurance_rates(
    pool: &MySqlPool,
    insurance_type: Option<&str>,
    start: i64,
    limit: i64,
) -> Result<(Vec<InsuranceRate>, i64), AppError> {
    let mut where_sql = String::from(" WHERE is_active = 1");
    if insurance_type.is_some() {
        where_sql.push_str(" AND insurance_type = ?");
    }
    let data_sql = format!(
        "SELECT {INSURANCE_RATE_COLS} FROM salary_v2_insurance_rates{where_sql} \
         ORDER BY effective_date DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, InsuranceRate>(&data_sql);
    if let Some(t) = insurance_type {
        data_q = data_q.bind(t);
    }
    let mut rows = data_q.fetch_all(pool).await?;
    for rate in &mut rows {
        if rate.min_base > 0 {
            rate.min_base /= 100;
        }
        if rate.max_base > 0 {
            rate.max_base /= 100;
        }
    }

    let count_sql = format!("SELECT COUNT(*) FROM salary_v2_insurance_rates{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(t) = insurance_type {
        count_q = count_q.bind(t);
    }
    let total = count_q.fetch_one(pool).await?;

    Ok((rows, total))
}

/// Raw stored rows (cents) for the calculator, newest effective date first.
pub async fn active_insurance_rates(pool: &MySqlPool) -> Result<Vec<InsuranceRate>, AppError> {
    let sql = format!(
        "SELECT {INSURANCE_RATE_COLS} FROM salary_v2_insurance_rates \
         WHERE is_active = 1 ORDER BY effective_date DESC"
    );
    Ok(sqlx::query_as::<_, InsuranceRate>(&sql).fetch_all(pool).await?)
}

pub async fn update_insurance_rate(
    pool: &MySqlPool,
    req: &UpdateInsuranceRateRequest,
    updated_by: &str,
) -> Result<(), AppError> {
    let sql = format!("SELECT {INSURANCE_RATE_COLS} FROM salary_v2_insurance_rates WHERE id = ?");
    let old = sqlx::query_as::<_, InsuranceRate>(&sql)
        .bind(req.id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("insurance rate {} not found", req.id)))?;

    let mut updated = old.clone();
    updated.insurance_type = req.insurance_type.to_string();
    updated.employee_rate = req.employee_rate;
    updated.employer_rate = req.employer_rate;
    updated.min_base = if req.min_base > 0.0 { to_cents(req.min_base) } else { 0 };
    updated.max_base = if req.max_base > 0.0 { to_cents(req.max_base) } else { 0 };
    updated.description = req.description.clone();
    updated.is_active = req.is_active;
    updated.effective_date = req.effective_date;
    updated.updated_by = updated_by.to_string();

    sqlx::query(
        "UPDATE salary_v2_insurance_rates SET insurance_type = ?, employee_rate = ?, \
         employer_rate = ?, min_base = ?, max_base = ?, description = ?, is_active = ?, \
         effective_date = ?, updated_by = ? WHERE id = ?",
    )
    .bind(&updated.insurance_type)
    .bind(updated.employee_rate)
    .bind(updated.employer_rate)
    .bind(updated.min_base)
    .bind(updated.max_base)
    .bind(&updated.description)
    .bind(updated.is_active)
    .bind(updated.effective_date)
    .bind(updated_by)
    .bind(req.id)
    .execute(pool)
    .await?;

    let old_value = serde_json::to_string(&old).unwrap_or_default();
    let new_value = serde_json::to_string(&updated).unwrap_or_default();
    record_history(
        pool,
        &old.insurance_rate_id,
        ParameterKind::InsuranceRate,
        &old_value,
        &new_value,
        "Insurance rate updated",
        updated_by,
    )
    .await;

    Ok(())
}

pub async fn deactivate_insurance_rate(
    pool: &MySqlPool,
    id: u64,
    deleted_by: &str,
) -> Result<(), AppError> {
    let sql = format!("SELECT {INSURANCE_RATE_COLS} FROM salary_v2_insurance_rates WHERE id = ?");
    let old = sqlx::query_as::<_, InsuranceRate>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("insurance rate {id} not found")))?;

    sqlx::query("UPDATE salary_v2_insurance_rates SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let old_value = serde_json::to_string(&old).unwrap_or_default();
    record_history(
        pool,
        &old.insurance_rate_id,
        ParameterKind::InsuranceRate,
        &old_value,
        "",
        "Insurance rate deleted",
        deleted_by,
    )
    .await;

    Ok(())
}

// ---------------------------------------------------------------------------
// Calculation rules
// ---------------------------------------------------------------------------

const CALCULATION_RULE_COLS: &str = "id, calculation_rule_id, rule_type, rule_name, rule_value, \
     rule_description, is_active, effective_date, created_by, updated_by";

pub async fn create_calculation_rule(
    pool: &MySqlPool,
    req: &CreateCalculationRuleRequest,
    created_by: &str,
) -> Result<String, AppError> {
    let calculation_rule_id = new_id("calculation_rule");
    sqlx::query(
        "INSERT INTO salary_v2_calculation_rules \
         (calculation_rule_id, rule_type, rule_name, rule_value, rule_description, \
          is_active, effective_date, created_by, updated_by) \
         VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?)",
    )
    .bind(&calculation_rule_id)
    .bind(req.rule_type.to_string())
    .bind(&req.rule_name)
    .bind(req.rule_value)
    .bind(&req.rule_description)
    .bind(req.effective_date)
    .bind(created_by)
    .bind(created_by)
    .execute(pool)
    .await?;
    Ok(calculation_rule_id)
}

pub async fn list_calculation_rules(
    pool: &MySqlPool,
    rule_type: Option<&str>,
    start: i64,
    limit: i64,
) -> Result<(Vec<CalculationRule>, i64), AppError> {
    let mut where_sql = String::from(" WHERE is_active = 1");
    if rule_type.is_some() {
        where_sql.push_str(" AND rule_type = ?");
    }
    let data_sql = format!(
        "SELECT {CALCULATION_RULE_COLS} FROM salary_v2_calculation_rules{where_sql} \
         ORDER BY rule_type ASC, rule_name ASC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, CalculationRule>(&data_sql);
    if let Some(t) = rule_type {
        data_q = data_q.bind(t);
    }
    let rows = data_q.fetch_all(pool).await?;

    let count_sql = format!("SELECT COUNT(*) FROM salary_v2_calculation_rules{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(t) = rule_type {
        count_q = count_q.bind(t);
    }
    let total = count_q.fetch_one(pool).await?;

    Ok((rows, total))
}

pub async fn active_rules_by_type(
    pool: &MySqlPool,
    rule_type: &str,
) -> Result<Vec<CalculationRule>, AppError> {
    let (rules, _) = list_calculation_rules(pool, Some(rule_type), -1, -1).await?;
    Ok(rules)
}

pub async fn update_calculation_rule(
    pool: &MySqlPool,
    req: &UpdateCalculationRuleRequest,
    updated_by: &str,
) -> Result<(), AppError> {
    let sql = format!("SELECT {CALCULATION_RULE_COLS} FROM salary_v2_calculation_rules WHERE id = ?");
    let old = sqlx::query_as::<_, CalculationRule>(&sql)
        .bind(req.id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("calculation rule {} not found", req.id)))?;

    let mut updated = old.clone();
    updated.rule_type = req.rule_type.to_string();
    updated.rule_name = req.rule_name.clone();
    updated.rule_value = req.rule_value;
    updated.rule_description = req.rule_description.clone();
    updated.is_active = req.is_active;
    updated.effective_date = req.effective_date;
    updated.updated_by = updated_by.to_string();

    sqlx::query(
        "UPDATE salary_v2_calculation_rules SET rule_type = ?, rule_name = ?, rule_value = ?, \
         rule_description = ?, is_active = ?, effective_date = ?, updated_by = ? WHERE id = ?",
    )
    .bind(&updated.rule_type)
    .bind(&updated.rule_name)
    .bind(updated.rule_value)
    .bind(&updated.rule_description)
    .bind(updated.is_active)
    .bind(updated.effective_date)
    .bind(updated_by)
    .bind(req.id)
    .execute(pool)
    .await?;

    let old_value = serde_json::to_string(&old).unwrap_or_default();
    let new_value = serde_json::to_string(&updated).unwrap_or_default();
    record_history(
        pool,
        &old.calculation_rule_id,
        ParameterKind::CalculationRule,
        &old_value,
        &new_value,
        "Calculation rule updated",
        updated_by,
    )
    .await;

    Ok(())
}

pub async fn deactivate_calculation_rule(
    pool: &MySqlPool,
    id: u64,
    deleted_by: &str,
) -> Result<(), AppError> {
    let sql = format!("SELECT {CALCULATION_RULE_COLS} FROM salary_v2_calculation_rules WHERE id = ?");
    let old = sqlx::query_as::<_, CalculationRule>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("calculation rule {id} not found")))?;

    sqlx::query("UPDATE salary_v2_calculation_rules SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let old_value = serde_json::to_string(&old).unwrap_or_default();
    record_history(
        pool,
        &old.calculation_rule_id,
        ParameterKind::CalculationRule,
        &old_value,
        "",
        "Calculation rule deleted",
        deleted_by,
    )
    .await;

    Ok(())
}

// ---------------------------------------------------------------------------
// System parameters
// ---------------------------------------------------------------------------

const SYSTEM_PARAMETER_COLS: &str = "id, parameter_id, parameter_key, parameter_value, \
     parameter_type, parameter_category, parameter_description, is_editable, is_active, \
     created_by, updated_by";

pub async fn create_system_parameter(
    pool: &MySqlPool,
    req: &CreateSystemParameterRequest,
    created_by: &str,
) -> Result<String, AppError> {
    if req.parameter_key.is_empty() {
        return Err(AppError::Validation("parameter_key is required".to_string()));
    }
    let parameter_id = new_id("parameter");
    sqlx::query(
        "INSERT INTO salary_v2_parameters \
         (parameter_id, parameter_key, parameter_value, parameter_type, parameter_category, \
          parameter_description, is_editable, is_active, created_by, updated_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&parameter_id)
    .bind(&req.parameter_key)
    .bind(&req.parameter_value)
    .bind(&req.parameter_type)
    .bind(&req.parameter_category)
    .bind(&req.parameter_description)
    .bind(req.is_editable)
    .bind(created_by)
    .bind(created_by)
    .execute(pool)
    .await?;
    Ok(parameter_id)
}

pub async fn list_system_parameters(
    pool: &MySqlPool,
    category: Option<&str>,
    start: i64,
    limit: i64,
) -> Result<(Vec<SystemParameter>, i64), AppError> {
    let mut where_sql = String::from(" WHERE is_active = 1");
    if category.is_some() {
        where_sql.push_str(" AND parameter_category = ?");
    }
    let data_sql = format!(
        "SELECT {SYSTEM_PARAMETER_COLS} FROM salary_v2_parameters{where_sql} \
         ORDER BY parameter_category ASC, parameter_key ASC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, SystemParameter>(&data_sql);
    if let Some(c) = category {
        data_q = data_q.bind(c);
    }
    let rows = data_q.fetch_all(pool).await?;

    let count_sql = format!("SELECT COUNT(*) FROM salary_v2_parameters{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(c) = category {
        count_q = count_q.bind(c);
    }
    let total = count_q.fetch_one(pool).await?;

    Ok((rows, total))
}

pub async fn get_system_parameter(
    pool: &MySqlPool,
    key: &str,
) -> Result<SystemParameter, AppError> {
    let sql = format!(
        "SELECT {SYSTEM_PARAMETER_COLS} FROM salary_v2_parameters \
         WHERE parameter_key = ? AND is_active = 1"
    );
    sqlx::query_as::<_, SystemParameter>(&sql)
        .bind(key)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::Computation(format!("system parameter '{key}' is not configured")))
}

pub async fn get_system_parameter_value(pool: &MySqlPool, key: &str) -> Result<String, AppError> {
    Ok(get_system_parameter(pool, key).await?.parameter_value)
}

pub async fn update_system_parameter(
    pool: &MySqlPool,
    req: &UpdateSystemParameterRequest,
    updated_by: &str,
) -> Result<(), AppError> {
    let sql = format!("SELECT {SYSTEM_PARAMETER_COLS} FROM salary_v2_parameters WHERE id = ?");
    let old = sqlx::query_as::<_, SystemParameter>(&sql)
        .bind(req.id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("system parameter {} not found", req.id)))?;

    let mut updated = old.clone();
    updated.parameter_key = req.parameter_key.clone();
    updated.parameter_value = req.parameter_value.clone();
    updated.parameter_type = req.parameter_type.clone();
    updated.parameter_category = req.parameter_category.clone();
    updated.parameter_description = req.parameter_description.clone();
    updated.is_editable = req.is_editable;
    updated.is_active = req.is_active;
    updated.updated_by = updated_by.to_string();

    sqlx::query(
        "UPDATE salary_v2_parameters SET parameter_key = ?, parameter_value = ?, \
         parameter_type = ?, parameter_category = ?, parameter_description = ?, \
         is_editable = ?, is_active = ?, updated_by = ? WHERE id = ?",
    )
    .bind(&updated.parameter_key)
    .bind(&updated.parameter_value)
    .bind(&updated.parameter_type)
    .bind(&updated.parameter_category)
    .bind(&updated.parameter_description)
    .bind(updated.is_editable)
    .bind(updated.is_active)
    .bind(updated_by)
    .bind(req.id)
    .execute(pool)
    .await?;

    let old_value = serde_json::to_string(&old).unwrap_or_default();
    let new_value = serde_json::to_string(&updated).unwrap_or_default();
    record_history(
        pool,
        &old.parameter_id,
        ParameterKind::SystemParameter,
        &old_value,
        &new_value,
        "System parameter updated",
        updated_by,
    )
    .await;

    Ok(())
}

pub async fn deactivate_system_parameter(
    pool: &MySqlPool,
    id: u64,
    deleted_by: &str,
) -> Result<(), AppError> {
    let sql = format!("SELECT {SYSTEM_PARAMETER_COLS} FROM salary_v2_parameters WHERE id = ?");
    let old = sqlx::query_as::<_, SystemParameter>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("system parameter {id} not found")))?;

    sqlx::query("UPDATE salary_v2_parameters SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let old_value = serde_json::to_string(&old).unwrap_or_default();
    record_history(
        pool,
        &old.parameter_id,
        ParameterKind::SystemParameter,
        &old_value,
        "",
        "System parameter deleted",
        deleted_by,
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_conversion_truncates() {
        assert_eq!(to_cents(36_000.0), 3_600_000);
        assert_eq!(to_cents(0.019), 1);
        assert_eq!(to_cents(0.0), 0);
    }
}
