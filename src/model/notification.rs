use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: u64,
    pub notice_id: String,
    pub notice_title: String,
    pub notice_content: String,
    pub notice_type: String,
    pub status: String,
    pub date: NaiveDateTime,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNotificationRequest {
    pub notice_title: String,
    pub notice_content: String,
    pub notice_type: String,
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNotificationRequest {
    pub id: u64,
    pub notice_title: String,
    pub notice_content: String,
    pub notice_type: String,
    pub status: String,
}
