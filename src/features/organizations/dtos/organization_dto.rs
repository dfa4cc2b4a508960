use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::organizations::models::Organization;
use crate::shared::validation::{deserialize_some, validate_not_blank};

/// Request DTO for creating an organization
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationDto {
    #[serde(default)]
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "may not be greater than 255 characters")
    )]
    #[schema(example = "Acme Design")]
    pub name: String,

    /// Billing plan, free-form (e.g. "free", "pro", "enterprise")
    #[validate(length(max = 50, message = "may not be greater than 50 characters"))]
    #[schema(example = "pro")]
    pub plan: Option<String>,
}

/// Request DTO for partially updating an organization
///
/// Omitted fields are left untouched; `plan: null` clears the plan.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganizationDto {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "may not be greater than 255 characters")
    )]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(length(max = 50, message = "may not be greater than 50 characters"))]
    #[schema(value_type = Option<String>)]
    pub plan: Option<Option<String>>,
}

/// Response DTO for organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationResponseDto {
    pub id: Uuid,
    pub name: String,
    pub plan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationResponseDto {
    fn from(o: Organization) -> Self {
        Self {
            id: o.id,
            name: o.name,
            plan: o.plan,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

/// Compact organization embedded in file listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationSummaryDto {
    pub id: Uuid,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_requires_name() {
        let dto: CreateOrganizationDto = serde_json::from_value(json!({"plan": "pro"})).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_create_rejects_long_plan() {
        let dto: CreateOrganizationDto =
            serde_json::from_value(json!({"name": "Acme", "plan": "x".repeat(51)})).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("plan"));
    }

    #[test]
    fn test_update_allows_empty_patch() {
        let dto: UpdateOrganizationDto = serde_json::from_value(json!({})).unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.name.is_none());
        assert!(dto.plan.is_none());
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let dto: UpdateOrganizationDto = serde_json::from_value(json!({"name": "  "})).unwrap();
        assert!(dto.validate().is_err());
    }
}
