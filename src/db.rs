use std::collections::HashMap;

use sqlx::MySqlPool;

use crate::config::Config;
use crate::response::AppError;

/// Per-branch connection registry. Built once at startup and injected through
/// `web::Data`; every request resolves its pool from the session's branch id.
pub struct Tenants {
    pools: HashMap<String, MySqlPool>,
    bootstrap_branch: String,
}

impl Tenants {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let mut pools = HashMap::new();
        for branch in &config.branches {
            let url = config.database_url_template.replace("{branch}", branch);
            let pool = MySqlPool::connect(&url).await?;
            tracing::info!(branch = %branch, "branch database registered");
            pools.insert(branch.clone(), pool);
        }
        let bootstrap_branch = config
            .branches
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("HRMS_BRANCHES is empty"))?;
        Ok(Self {
            pools,
            bootstrap_branch,
        })
    }

    pub fn branch(&self, branch_id: &str) -> Result<&MySqlPool, AppError> {
        self.pools
            .get(branch_id)
            .ok_or_else(|| AppError::Unauthorized(format!("unknown branch company: {branch_id}")))
    }

    /// Pre-login database; used only for the branch-company listing.
    pub fn bootstrap(&self) -> &MySqlPool {
        &self.pools[&self.bootstrap_branch]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MySqlPool)> {
        self.pools.iter()
    }
}
