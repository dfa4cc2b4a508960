use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::User;
use crate::shared::validation::{deserialize_some, validate_json_object, validate_not_blank};

/// Request DTO for creating a user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[serde(default)]
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "may not be greater than 255 characters")
    )]
    #[schema(example = "Ada Lovelace")]
    pub name: String,

    #[serde(default)]
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 255, message = "may not be greater than 255 characters")
    )]
    #[schema(example = "ada@example.com")]
    pub email: String,

    /// Organization the user belongs to; must exist when given
    pub organization_id: Option<Uuid>,

    #[validate(url(message = "must be a valid URL"))]
    pub avatar_url: Option<String>,

    #[validate(custom(function = "validate_json_object"))]
    pub metadata: Option<serde_json::Value>,
}

/// Request DTO for partially updating a user
///
/// `organization_id: null` detaches the user from its organization.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "may not be greater than 255 characters")
    )]
    pub name: Option<String>,

    #[validate(
        email(message = "must be a valid email address"),
        length(max = 255, message = "may not be greater than 255 characters")
    )]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Uuid>)]
    pub organization_id: Option<Option<Uuid>>,

    #[validate(url(message = "must be a valid URL"))]
    pub avatar_url: Option<String>,

    #[validate(custom(function = "validate_json_object"))]
    pub metadata: Option<serde_json::Value>,
}

/// Response DTO for user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub organization_id: Option<Uuid>,
    pub avatar_url: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            organization_id: u.organization_id,
            avatar_url: u.avatar_url,
            last_login: u.last_login,
            metadata: u.metadata,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Compact user embedded in file listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
