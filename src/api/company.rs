use actix_web::{HttpResponse, web};

use crate::db::Tenants;
use crate::model::authority::BranchCompany;
use crate::response::{self, AppError};

/// Branch companies, read from the bootstrap database. This is the only
/// endpoint served before login; the login form uses it to pick a branch.
#[utoipa::path(
    get,
    path = "/api/company/query",
    responses((status = 200, description = "Branch companies")),
    tag = "Company"
)]
pub async fn query_companies(tenants: web::Data<Tenants>) -> Result<HttpResponse, AppError> {
    let pool = tenants.bootstrap();
    let companies = sqlx::query_as::<_, BranchCompany>(
        "SELECT id, branch_id, company_name FROM branch_company ORDER BY branch_id ASC",
    )
    .fetch_all(pool)
    .await?;
    let total = companies.len() as i64;
    Ok(response::ok_with_total(companies, total, ""))
}
