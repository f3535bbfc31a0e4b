use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rank {
    pub id: u64,
    pub rank_id: String,
    pub rank_name: String,
    pub rank_describe: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRankRequest {
    pub rank_name: String,
    pub rank_describe: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRankRequest {
    pub rank_id: String,
    pub rank_name: String,
    pub rank_describe: String,
}
