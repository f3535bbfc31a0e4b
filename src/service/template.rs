//! Salary templates: named sets of fixed/percentage pay components scoped to
//! ranks/departments. Applying one aggregates item contributions into the
//! five pay buckets without persisting anything; the caller decides whether
//! to copy the result into the staff member's pay structure.

use sqlx::MySqlPool;

use crate::model::staff::Staff;
use crate::model::template::{
    CalculationType, CreateTemplateRequest, ItemType, SalaryTemplate, SalaryTemplateItem,
    TemplateAmounts, TemplateQuery, TemplateWithItems, UpdateTemplateRequest,
};
use crate::response::AppError;
use crate::utils::ids::new_id;
use crate::utils::page::limit_clause;

const TEMPLATE_COLS: &str = "id, template_id, template_name, template_description, template_type, \
     applicable_rank_ids, applicable_dep_ids, is_active, created_by, updated_by";

const ITEM_COLS: &str = "id, item_id, template_id, item_name, item_type, calculation_type, \
     amount, percentage, base_field, sort_order, is_required";

/// Pure aggregation of a template's items over a base salary (cents). The
/// base bucket starts at the base salary itself; unknown item or calculation
/// types contribute nothing.
pub fn apply_items(items: &[SalaryTemplateItem], base_salary: i64) -> TemplateAmounts {
    let mut amounts = TemplateAmounts {
        base: base_salary,
        ..TemplateAmounts::default()
    };

    for item in items {
        let contribution = match item.calculation_type() {
            Some(CalculationType::Fixed) => item.amount.unwrap_or(0),
            Some(CalculationType::Percentage) => item
                .percentage
                .map(|p| (base_salary as f64 * (p / 100.0)) as i64)
                .unwrap_or(0),
            None => 0,
        };

        match item.item_type() {
            Some(ItemType::Base) => amounts.base += contribution,
            Some(ItemType::Subsidy) => amounts.subsidy += contribution,
            Some(ItemType::Bonus) => amounts.bonus += contribution,
            Some(ItemType::Commission) => amounts.commission += contribution,
            Some(ItemType::Other) => amounts.other += contribution,
            None => {}
        }
    }

    amounts
}

/// Whether a stored allow-list admits the given id. An empty list (or an
/// empty column) is unrestricted.
pub fn scope_allows(list_json: &str, id: &str) -> Result<bool, serde_json::Error> {
    if list_json.trim().is_empty() {
        return Ok(true);
    }
    let ids: Vec<String> = serde_json::from_str(list_json)?;
    Ok(ids.is_empty() || ids.iter().any(|entry| entry == id))
}

pub async fn create_template(
    pool: &MySqlPool,
    req: &CreateTemplateRequest,
    created_by: &str,
) -> Result<String, AppError> {
    if req.template_name.is_empty() {
        return Err(AppError::Validation("template_name is required".to_string()));
    }
    let template_id = new_id("template");
    let rank_ids = serde_json::to_string(&req.applicable_rank_ids)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let dep_ids = serde_json::to_string(&req.applicable_dep_ids)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO salary_v2_templates \
         (template_id, template_name, template_description, template_type, \
          applicable_rank_ids, applicable_dep_ids, is_active, created_by, updated_by) \
         VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&template_id)
    .bind(&req.template_name)
    .bind(&req.template_description)
    .bind(&req.template_type)
    .bind(&rank_ids)
    .bind(&dep_ids)
    .bind(created_by)
    .bind(created_by)
    .execute(&mut *tx)
    .await?;

    for item in &req.items {
        sqlx::query(
            "INSERT INTO salary_v2_template_items \
             (item_id, template_id, item_name, item_type, calculation_type, amount, percentage, \
              base_field, sort_order, is_required) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("template_item"))
        .bind(&template_id)
        .bind(&item.item_name)
        .bind(item.item_type.to_string())
        .bind(item.calculation_type.to_string())
        .bind(item.amount)
        .bind(item.percentage)
        .bind(&item.base_field)
        .bind(item.sort_order)
        .bind(item.is_required)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(template_id)
}

/// Replace a template and its items in one transaction.
pub async fn update_template(
    pool: &MySqlPool,
    req: &UpdateTemplateRequest,
    updated_by: &str,
) -> Result<(), AppError> {
    let exists = sqlx::query_as::<_, (u64,)>(
        "SELECT id FROM salary_v2_templates WHERE template_id = ?",
    )
    .bind(&req.template_id)
    .fetch_optional(pool)
    .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "template {} not found",
            req.template_id
        )));
    }

    let rank_ids = serde_json::to_string(&req.applicable_rank_ids)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let dep_ids = serde_json::to_string(&req.applicable_dep_ids)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE salary_v2_templates SET template_name = ?, template_description = ?, \
         template_type = ?, applicable_rank_ids = ?, applicable_dep_ids = ?, is_active = ?, \
         updated_by = ? WHERE template_id = ?",
    )
    .bind(&req.template_name)
    .bind(&req.template_description)
    .bind(&req.template_type)
    .bind(&rank_ids)
    .bind(&dep_ids)
    .bind(req.is_active)
    .bind(updated_by)
    .bind(&req.template_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM salary_v2_template_items WHERE template_id = ?")
        .bind(&req.template_id)
        .execute(&mut *tx)
        .await?;

    for item in &req.items {
        sqlx::query(
            "INSERT INTO salary_v2_template_items \
             (item_id, template_id, item_name, item_type, calculation_type, amount, percentage, \
              base_field, sort_order, is_required) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id("template_item"))
        .bind(&req.template_id)
        .bind(&item.item_name)
        .bind(item.item_type.to_string())
        .bind(item.calculation_type.to_string())
        .bind(item.amount)
        .bind(item.percentage)
        .bind(&item.base_field)
        .bind(item.sort_order)
        .bind(item.is_required)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_template(pool: &MySqlPool, template_id: &str) -> Result<(), AppError> {
    let exists = sqlx::query_as::<_, (u64,)>(
        "SELECT id FROM salary_v2_templates WHERE template_id = ?",
    )
    .bind(template_id)
    .fetch_optional(pool)
    .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!("template {template_id} not found")));
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM salary_v2_template_items WHERE template_id = ?")
        .bind(template_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM salary_v2_templates WHERE template_id = ?")
        .bind(template_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

async fn items_of(pool: &MySqlPool, template_id: &str) -> Result<Vec<SalaryTemplateItem>, AppError> {
    let sql = format!(
        "SELECT {ITEM_COLS} FROM salary_v2_template_items WHERE template_id = ? \
         ORDER BY sort_order ASC"
    );
    Ok(sqlx::query_as::<_, SalaryTemplateItem>(&sql)
        .bind(template_id)
        .fetch_all(pool)
        .await?)
}

pub async fn get_template(pool: &MySqlPool, template_id: &str) -> Result<TemplateWithItems, AppError> {
    let sql = format!("SELECT {TEMPLATE_COLS} FROM salary_v2_templates WHERE template_id = ?");
    let template = sqlx::query_as::<_, SalaryTemplate>(&sql)
        .bind(template_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("template {template_id} not found")))?;
    let items = items_of(pool, template_id).await?;
    Ok(TemplateWithItems { template, items })
}

pub async fn query_templates(
    pool: &MySqlPool,
    query: &TemplateQuery,
) -> Result<(Vec<TemplateWithItems>, i64), AppError> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();
    if let Some(name) = query.template_name.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND template_name LIKE ?");
        binds.push(format!("%{name}%"));
    }
    if let Some(t) = query.template_type.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND template_type = ?");
        binds.push(t.to_string());
    }
    if let Some(active) = query.is_active {
        where_sql.push_str(" AND is_active = ?");
        binds.push(if active { "1".to_string() } else { "0".to_string() });
    }

    let count_sql = format!("SELECT COUNT(*) FROM salary_v2_templates{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &binds {
        count_q = count_q.bind(b);
    }
    let total = count_q.fetch_one(pool).await?;

    let (start, limit) = crate::utils::page::PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .window();
    let data_sql = format!(
        "SELECT {TEMPLATE_COLS} FROM salary_v2_templates{where_sql} ORDER BY id DESC{}",
        limit_clause(start, limit)
    );
    let mut data_q = sqlx::query_as::<_, SalaryTemplate>(&data_sql);
    for b in &binds {
        data_q = data_q.bind(b);
    }
    let templates = data_q.fetch_all(pool).await?;

    let mut result = Vec::with_capacity(templates.len());
    for template in templates {
        let items = items_of(pool, &template.template_id).await?;
        result.push(TemplateWithItems { template, items });
    }
    Ok((result, total))
}

pub async fn apply_template(
    pool: &MySqlPool,
    template_id: &str,
    base_salary: i64,
) -> Result<TemplateAmounts, AppError> {
    let with_items = get_template(pool, template_id).await?;
    if !with_items.template.is_active {
        return Err(AppError::Conflict(format!(
            "template {template_id} is disabled"
        )));
    }
    Ok(apply_items(&with_items.items, base_salary))
}

/// Active templates whose rank/department allow-lists admit the staff member.
pub async fn applicable_templates(
    pool: &MySqlPool,
    staff_id: &str,
) -> Result<Vec<TemplateWithItems>, AppError> {
    let staff = sqlx::query_as::<_, Staff>(
        "SELECT id, staff_id, staff_name, leader_staff_id, leader_name, birthday, identity_num, \
         sex, nation, school, major, edu_level, base_salary, card_num, rank_id, dep_id, email, \
         phone, entry_date, status, probation_end_date, resignation_date, resignation_reason \
         FROM staff WHERE staff_id = ?",
    )
    .bind(staff_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("staff {staff_id} not found")))?;

    let sql = format!("SELECT {TEMPLATE_COLS} FROM salary_v2_templates WHERE is_active = 1");
    let templates = sqlx::query_as::<_, SalaryTemplate>(&sql).fetch_all(pool).await?;

    let mut applicable = Vec::new();
    for template in templates {
        let rank_ok = match scope_allows(&template.applicable_rank_ids, &staff.rank_id) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(template_id = %template.template_id, error = %e, "bad rank id list");
                continue;
            }
        };
        let dep_ok = match scope_allows(&template.applicable_dep_ids, &staff.dep_id) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(template_id = %template.template_id, error = %e, "bad dep id list");
                continue;
            }
        };
        if !(rank_ok && dep_ok) {
            continue;
        }
        let items = items_of(pool, &template.template_id).await?;
        applicable.push(TemplateWithItems { template, items });
    }
    Ok(applicable)
}

pub async fn toggle_status(
    pool: &MySqlPool,
    template_id: &str,
    is_active: bool,
) -> Result<(), AppError> {
    let exists = sqlx::query_as::<_, (u64,)>(
        "SELECT id FROM salary_v2_templates WHERE template_id = ?",
    )
    .bind(template_id)
    .fetch_optional(pool)
    .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!("template {template_id} not found")));
    }
    sqlx::query("UPDATE salary_v2_templates SET is_active = ? WHERE template_id = ?")
        .bind(is_active)
        .bind(template_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(
        item_type: &str,
        calculation_type: &str,
        amount: Option<i64>,
        percentage: Option<f64>,
        sort_order: i64,
    ) -> SalaryTemplateItem {
        SalaryTemplateItem {
            id: 0,
            item_id: format!("template_item_{sort_order}"),
            template_id: "template_test".to_string(),
            item_name: item_type.to_string(),
            item_type: item_type.to_string(),
            calculation_type: calculation_type.to_string(),
            amount,
            percentage,
            base_field: None,
            sort_order,
            is_required: false,
        }
    }

    #[test]
    fn fixed_and_percentage_items_fill_their_buckets() {
        let items = vec![
            item("base", "fixed", Some(500_000), None, 1),
            item("bonus", "percentage", None, Some(10.0), 2),
        ];
        let amounts = apply_items(&items, 2_000_000);
        assert_eq!(
            amounts,
            TemplateAmounts {
                base: 2_500_000,
                subsidy: 0,
                bonus: 200_000,
                commission: 0,
                other: 0
            }
        );
    }

    #[test]
    fn unknown_types_contribute_nothing() {
        let items = vec![
            item("stock_options", "fixed", Some(1_000), None, 1),
            item("bonus", "lottery", Some(1_000), None, 2),
        ];
        let amounts = apply_items(&items, 100_000);
        assert_eq!(amounts.base, 100_000);
        assert_eq!(amounts.bonus, 0);
    }

    #[test]
    fn missing_amount_or_percentage_is_zero() {
        let items = vec![
            item("subsidy", "fixed", None, None, 1),
            item("other", "percentage", None, None, 2),
        ];
        let amounts = apply_items(&items, 100_000);
        assert_eq!(amounts.subsidy, 0);
        assert_eq!(amounts.other, 0);
    }

    #[test]
    fn empty_scope_list_is_unrestricted() {
        assert!(scope_allows("", "R001").unwrap());
        assert!(scope_allows("[]", "R001").unwrap());
        assert!(scope_allows("[\"R001\",\"R002\"]", "R001").unwrap());
        assert!(!scope_allows("[\"R002\"]", "R001").unwrap());
        assert!(scope_allows("not json", "R001").is_err());
    }
}
