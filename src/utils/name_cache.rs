use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// branch-scoped display-name cache (staff, department and rank names),
/// shared by the VO conversions so list endpoints skip the per-row lookups.
pub static NAME_CACHE: Lazy<Cache<String, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

fn key(branch_id: &str, kind: &str, id: &str) -> String {
    format!("{branch_id}:{kind}:{id}")
}

async fn lookup(
    pool: &MySqlPool,
    branch_id: &str,
    kind: &str,
    sql: &str,
    id: &str,
) -> Option<String> {
    let cache_key = key(branch_id, kind, id);
    if let Some(name) = NAME_CACHE.get(&cache_key).await {
        return Some(name);
    }
    let row = sqlx::query_as::<_, (String,)>(sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .ok()
        .flatten()?;
    NAME_CACHE.insert(cache_key, row.0.clone()).await;
    Some(row.0)
}

pub async fn staff_name(pool: &MySqlPool, branch_id: &str, staff_id: &str) -> Option<String> {
    lookup(
        pool,
        branch_id,
        "staff",
        "SELECT staff_name FROM staff WHERE staff_id = ?",
        staff_id,
    )
    .await
}

pub async fn dep_name(pool: &MySqlPool, branch_id: &str, dep_id: &str) -> Option<String> {
    lookup(
        pool,
        branch_id,
        "dep",
        "SELECT dep_name FROM department WHERE dep_id = ?",
        dep_id,
    )
    .await
}

pub async fn rank_name(pool: &MySqlPool, branch_id: &str, rank_id: &str) -> Option<String> {
    lookup(
        pool,
        branch_id,
        "rank",
        "SELECT rank_name FROM `rank` WHERE rank_id = ?",
        rank_id,
    )
    .await
}

/// Drop a staff member's cached name after a rename or deletion.
pub async fn forget_staff(branch_id: &str, staff_id: &str) {
    NAME_CACHE.invalidate(&key(branch_id, "staff", staff_id)).await;
}

pub async fn forget_dep(branch_id: &str, dep_id: &str) {
    NAME_CACHE.invalidate(&key(branch_id, "dep", dep_id)).await;
}

pub async fn forget_rank(branch_id: &str, rank_id: &str) {
    NAME_CACHE.invalidate(&key(branch_id, "rank", rank_id)).await;
}

async fn batch_insert(branch_id: &str, kind: &str, entries: &[(String, String)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|(id, name)| NAME_CACHE.insert(key(branch_id, kind, id), name.clone()))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load a branch's staff names into the in-memory cache (batched).
pub async fn warmup_name_cache(
    pool: &MySqlPool,
    branch_id: &str,
    batch_size: usize,
) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (String, String)>("SELECT staff_id, staff_name FROM staff").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (staff_id, staff_name) = row?;
        batch.push((staff_id, staff_name));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_insert(branch_id, "staff", &batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_insert(branch_id, "staff", &batch).await;
    }

    log::info!(
        "Name cache warmup complete for branch {}: {} staff",
        branch_id,
        total_count
    );

    Ok(())
}
