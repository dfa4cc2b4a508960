use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::comments::models::Comment;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::validation::validate_not_blank;

/// Request DTO for commenting on a file
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    /// Author; must reference an existing user
    #[validate(required(message = "is required"))]
    pub user_id: Option<Uuid>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Can we bump the contrast on this button?")]
    pub content: String,

    /// Canvas coordinates the comment is pinned to
    #[schema(example = 120.5)]
    pub position_x: Option<f64>,

    #[schema(example = 48.0)]
    pub position_y: Option<f64>,
}

/// Request DTO for editing a comment; only the content can change
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentDto {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub content: String,
}

/// Response DTO for comment, with its author when still present
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<UserResponseDto>,
}

impl CommentResponseDto {
    pub fn from_comment(c: Comment, user: Option<UserResponseDto>) -> Self {
        Self {
            id: c.id,
            file_id: c.file_id,
            user_id: c.user_id,
            content: c.content,
            position_x: c.position_x,
            position_y: c.position_y,
            is_resolved: c.is_resolved,
            created_at: c.created_at,
            updated_at: c.updated_at,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_requires_author_and_content() {
        let dto: CreateCommentDto = serde_json::from_value(json!({ "content": "  " })).unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_id"));
        assert!(fields.contains_key("content"));
    }

    #[test]
    fn test_create_with_position() {
        let dto: CreateCommentDto = serde_json::from_value(json!({
            "user_id": Uuid::new_v4(),
            "content": "Looks good",
            "position_x": 10,
            "position_y": 20.25
        }))
        .unwrap();

        assert!(dto.validate().is_ok());
        assert_eq!(dto.position_x, Some(10.0));
        assert_eq!(dto.position_y, Some(20.25));
    }

    #[test]
    fn test_update_rejects_missing_content() {
        let dto: UpdateCommentDto = serde_json::from_value(json!({})).unwrap();
        assert!(dto.validate().is_err());
    }
}
