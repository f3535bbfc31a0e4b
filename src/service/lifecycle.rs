//! Staff lifecycle: creation plus the forward-only status transitions
//! (onboard → promote → transfer → resign). Every transition appends one
//! lifecycle-log row with old/new value snapshots; a failed log write is
//! warned about but never fails the action itself.

use chrono::Local;
use sqlx::MySqlPool;

use crate::auth::password::hash_password;
use crate::model::authority::USER_TYPE_NORMAL;
use crate::model::staff::{
    CreateStaffRequest, OnboardStaffRequest, PromoteStaffRequest, ResignStaffRequest,
    STATUS_PROBATION, STATUS_REGULAR, STATUS_RESIGNED, Staff, TransferStaffRequest,
};
use crate::response::AppError;
use crate::utils::ids::{new_id, new_staff_id};

const STAFF_COLS: &str = "id, staff_id, staff_name, leader_staff_id, leader_name, birthday, \
     identity_num, sex, nation, school, major, edu_level, base_salary, card_num, rank_id, dep_id, \
     email, phone, entry_date, status, probation_end_date, resignation_date, resignation_reason";

pub async fn record_lifecycle(
    pool: &MySqlPool,
    staff_id: &str,
    action_type: &str,
    old_value: &str,
    new_value: &str,
    operator: &str,
    remark: &str,
) {
    let result = sqlx::query(
        "INSERT INTO staff_lifecycle_log \
         (staff_id, action_type, old_value, new_value, action_date, operator, remark) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(staff_id)
    .bind(action_type)
    .bind(old_value)
    .bind(new_value)
    .bind(Local::now().naive_local())
    .bind(operator)
    .bind(remark)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, staff_id, action_type, "lifecycle log write failed");
    }
}

pub async fn get_staff(pool: &MySqlPool, staff_id: &str) -> Result<Staff, AppError> {
    let sql = format!("SELECT {STAFF_COLS} FROM staff WHERE staff_id = ?");
    sqlx::query_as::<_, Staff>(&sql)
        .bind(staff_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("staff {staff_id} not found")))
}

/// Insert a staff row (probation status) plus a default normal-user account.
/// The initial account password is the staff id; ops reset it after handover.
pub async fn create_staff(pool: &MySqlPool, req: &CreateStaffRequest) -> Result<String, AppError> {
    if req.staff_name.is_empty() {
        return Err(AppError::Validation("staff_name is required".to_string()));
    }
    if req.base_salary < 0 {
        return Err(AppError::Validation("base_salary must be non-negative".to_string()));
    }

    let staff_id = new_staff_id();
    sqlx::query(
        "INSERT INTO staff \
         (staff_id, staff_name, leader_staff_id, leader_name, birthday, identity_num, sex, \
          nation, school, major, edu_level, base_salary, card_num, rank_id, dep_id, email, phone, \
          entry_date, status) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&staff_id)
    .bind(&req.staff_name)
    .bind(&req.leader_staff_id)
    .bind(&req.leader_name)
    .bind(req.birthday)
    .bind(&req.identity_num)
    .bind(req.sex)
    .bind(&req.nation)
    .bind(&req.school)
    .bind(&req.major)
    .bind(&req.edu_level)
    .bind(req.base_salary)
    .bind(&req.card_num)
    .bind(&req.rank_id)
    .bind(&req.dep_id)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(req.entry_date)
    .bind(STATUS_PROBATION)
    .execute(pool)
    .await?;

    let initial_password = hash_password(&staff_id)?;
    sqlx::query(
        "INSERT INTO authority (authority_id, staff_id, user_type, user_password) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(new_id("authority"))
    .bind(&staff_id)
    .bind(USER_TYPE_NORMAL)
    .bind(&initial_password)
    .execute(pool)
    .await?;

    Ok(staff_id)
}

pub async fn onboard_staff(
    pool: &MySqlPool,
    req: &OnboardStaffRequest,
    operator: &str,
) -> Result<String, AppError> {
    let staff_id = create_staff(pool, &req.staff).await?;

    if let Some(end) = req.probation_end_date {
        sqlx::query("UPDATE staff SET probation_end_date = ? WHERE staff_id = ?")
            .bind(end)
            .bind(&staff_id)
            .execute(pool)
            .await?;
    }

    let new_value = serde_json::json!({
        "staff_id": staff_id,
        "status": STATUS_PROBATION,
        "candidate_id": req.candidate_id,
    })
    .to_string();
    record_lifecycle(pool, &staff_id, "onboard", "{}", &new_value, operator, "staff onboarded")
        .await;

    Ok(staff_id)
}

pub async fn promote_staff(
    pool: &MySqlPool,
    req: &PromoteStaffRequest,
    operator: &str,
) -> Result<(), AppError> {
    let current = get_staff(pool, &req.staff_id).await?;
    if current.status != STATUS_PROBATION {
        return Err(AppError::Conflict(format!(
            "staff {} is not on probation",
            req.staff_id
        )));
    }

    sqlx::query("UPDATE staff SET status = ?, probation_end_date = ? WHERE staff_id = ?")
        .bind(STATUS_REGULAR)
        .bind(req.probation_end_date)
        .bind(&req.staff_id)
        .execute(pool)
        .await?;

    let old_value = serde_json::json!({ "status": current.status }).to_string();
    let new_value = serde_json::json!({
        "status": STATUS_REGULAR,
        "probation_end_date": req.probation_end_date,
    })
    .to_string();
    record_lifecycle(
        pool,
        &req.staff_id,
        "promote",
        &old_value,
        &new_value,
        operator,
        "probation ended",
    )
    .await;

    Ok(())
}

pub async fn transfer_staff(
    pool: &MySqlPool,
    req: &TransferStaffRequest,
    operator: &str,
) -> Result<(), AppError> {
    let current = get_staff(pool, &req.staff_id).await?;
    if current.status == STATUS_RESIGNED {
        return Err(AppError::Conflict(format!(
            "staff {} has resigned",
            req.staff_id
        )));
    }

    sqlx::query("UPDATE staff SET dep_id = ?, rank_id = ? WHERE staff_id = ?")
        .bind(&req.dep_id)
        .bind(&req.rank_id)
        .bind(&req.staff_id)
        .execute(pool)
        .await?;

    let old_value = serde_json::json!({
        "dep_id": current.dep_id,
        "rank_id": current.rank_id,
    })
    .to_string();
    let new_value = serde_json::json!({
        "dep_id": req.dep_id,
        "rank_id": req.rank_id,
    })
    .to_string();
    record_lifecycle(
        pool,
        &req.staff_id,
        "transfer",
        &old_value,
        &new_value,
        operator,
        "department/rank transfer",
    )
    .await;

    Ok(())
}

pub async fn resign_staff(
    pool: &MySqlPool,
    req: &ResignStaffRequest,
    operator: &str,
) -> Result<(), AppError> {
    let current = get_staff(pool, &req.staff_id).await?;
    if current.status == STATUS_RESIGNED {
        return Err(AppError::Conflict(format!(
            "staff {} has already resigned",
            req.staff_id
        )));
    }

    sqlx::query(
        "UPDATE staff SET status = ?, resignation_date = ?, resignation_reason = ? \
         WHERE staff_id = ?",
    )
    .bind(STATUS_RESIGNED)
    .bind(req.resignation_date)
    .bind(&req.resignation_reason)
    .bind(&req.staff_id)
    .execute(pool)
    .await?;

    let old_value = serde_json::json!({ "status": current.status }).to_string();
    let new_value = serde_json::json!({
        "status": STATUS_RESIGNED,
        "resignation_date": req.resignation_date,
        "resignation_reason": req.resignation_reason,
    })
    .to_string();
    record_lifecycle(
        pool,
        &req.staff_id,
        "resign",
        &old_value,
        &new_value,
        operator,
        "staff resigned",
    )
    .await;

    Ok(())
}
