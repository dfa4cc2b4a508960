use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for files
///
/// `thumbnail_blob` is never selected.
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub organization_id: Uuid,
    pub version: i32,
    pub is_public: bool,
    pub view_count: i64,
    pub last_modified: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// File joined with its owner and organization names for listings
#[derive(Debug, Clone, FromRow)]
pub struct FileListRow {
    #[sqlx(flatten)]
    pub file: File,
    pub owner_name: String,
    pub owner_email: String,
    pub organization_name: String,
}
