use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for comments
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
