use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::organizations::dtos::{
    CreateOrganizationDto, OrganizationResponseDto, UpdateOrganizationDto,
};
use crate::features::organizations::models::Organization;
use crate::shared::constants::DEFAULT_ORGANIZATION_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

/// Convert database errors raised by organization writes
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict(
                "Organization still has users or files attached".to_string(),
            );
        }
    }
    AppError::Database(e)
}

/// Service for organization operations
pub struct OrganizationService {
    pool: PgPool,
}

impl OrganizationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List organizations, newest first
    pub async fn list(
        &self,
        page: &PaginationQuery,
    ) -> Result<(Vec<OrganizationResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count organizations: {:?}", e);
                AppError::Database(e)
            })?;

        let organizations: Vec<Organization> = sqlx::query_as(
            r#"
            SELECT id, name, plan, created_at, updated_at
            FROM organizations
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit(DEFAULT_ORGANIZATION_PAGE_SIZE))
        .bind(page.offset(DEFAULT_ORGANIZATION_PAGE_SIZE))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list organizations: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((organizations.into_iter().map(Into::into).collect(), total))
    }

    pub async fn create(&self, dto: CreateOrganizationDto) -> Result<OrganizationResponseDto> {
        let organization: Organization = sqlx::query_as(
            r#"
            INSERT INTO organizations (name, plan)
            VALUES ($1, $2)
            RETURNING id, name, plan, created_at, updated_at
            "#,
        )
        .bind(dto.name.trim())
        .bind(dto.plan)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create organization: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(organization_id = %organization.id, "Organization created");
        Ok(organization.into())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<OrganizationResponseDto> {
        let organization: Option<Organization> = sqlx::query_as(
            r#"
            SELECT id, name, plan, created_at, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        organization
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Organization {} not found", id)))
    }

    /// Whether an organization with this id exists
    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM organizations WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateOrganizationDto,
    ) -> Result<OrganizationResponseDto> {
        let plan_present = dto.plan.is_some();

        let organization: Option<Organization> = sqlx::query_as(
            r#"
            UPDATE organizations
            SET name = COALESCE($2, name),
                plan = CASE WHEN $3 THEN $4 ELSE plan END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, plan, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(plan_present)
        .bind(dto.plan.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        organization
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Organization {} not found", id)))
    }

    /// Hard delete; refused while users or files still reference the organization
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let (users, files): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE organization_id = $1),
                (SELECT COUNT(*) FROM files WHERE organization_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if users > 0 || files > 0 {
            return Err(AppError::Conflict(format!(
                "Organization {} still has {} user(s) and {} file(s)",
                id, users, files
            )));
        }

        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Organization {} not found", id)));
        }

        tracing::info!(organization_id = %id, "Organization deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto(name: &str, plan: Option<&str>) -> CreateOrganizationDto {
        CreateOrganizationDto {
            name: name.to_string(),
            plan: plan.map(str::to_string),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_update_patch_semantics(pool: PgPool) {
        let service = OrganizationService::new(pool);
        let org = service
            .create(create_dto("  Acme  ", Some("pro")))
            .await
            .unwrap();
        assert_eq!(org.name, "Acme");

        // Absent plan is left alone
        let renamed = service
            .update(
                org.id,
                UpdateOrganizationDto {
                    name: Some("Acme Studio".to_string()),
                    plan: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Acme Studio");
        assert_eq!(renamed.plan.as_deref(), Some("pro"));

        // Explicit null clears it
        let cleared = service
            .update(
                org.id,
                UpdateOrganizationDto {
                    name: None,
                    plan: Some(None),
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.name, "Acme Studio");
        assert_eq!(cleared.plan, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_delete_blocked_by_members(pool: PgPool) {
        let service = OrganizationService::new(pool.clone());
        let org = service.create(create_dto("Acme", None)).await.unwrap();

        sqlx::query("INSERT INTO users (name, email, organization_id) VALUES ($1, $2, $3)")
            .bind("Member")
            .bind("member@example.com")
            .bind(org.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = service.delete(org.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(service.get_by_id(org.id).await.is_ok());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_delete_and_missing(pool: PgPool) {
        let service = OrganizationService::new(pool);
        let org = service.create(create_dto("Solo", None)).await.unwrap();

        service.delete(org.id).await.unwrap();
        assert!(matches!(
            service.get_by_id(org.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(org.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
