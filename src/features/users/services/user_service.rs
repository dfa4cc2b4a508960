use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, FieldError, Result};
use crate::features::users::dtos::{CreateUserDto, UpdateUserDto, UserResponseDto};
use crate::features::users::models::User;
use crate::shared::constants::DEFAULT_USER_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

const USER_COLUMNS: &str = r#"
    id, name, email, organization_id, avatar_url, last_login, metadata, created_at, updated_at
"#;

/// Convert database errors raised by user writes
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // Lost the race against a concurrent insert with the same email
        if db_err.is_unique_violation() {
            return AppError::invalid_field("email", "has already been taken");
        }
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict("User is still referenced by other records".to_string());
        }
    }
    AppError::Database(e)
}

/// Service for user operations
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List users, newest first
    pub async fn list(&self, page: &PaginationQuery) -> Result<(Vec<UserResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let users: Vec<User> = sqlx::query_as(&query)
            .bind(page.limit(DEFAULT_USER_PAGE_SIZE))
            .bind(page.offset(DEFAULT_USER_PAGE_SIZE))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    pub async fn create(&self, dto: CreateUserDto) -> Result<UserResponseDto> {
        let email = dto.email.trim().to_string();

        let mut errors = Vec::new();
        if self.email_taken(&email, None).await? {
            errors.push(FieldError::new("email", "has already been taken"));
        }
        if let Some(org_id) = dto.organization_id {
            if !self.organization_exists(org_id).await? {
                errors.push(FieldError::new("organization_id", "does not exist"));
            }
        }
        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        let query = format!(
            r#"
            INSERT INTO users (name, email, organization_id, avatar_url, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user: User = sqlx::query_as(&query)
            .bind(dto.name.trim())
            .bind(&email)
            .bind(dto.organization_id)
            .bind(dto.avatar_url)
            .bind(dto.metadata)
            .fetch_one(&self.pool)
            .await
            .map_err(handle_db_error)?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user.into())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponseDto> {
        self.find(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    /// Load several users at once, keyed by id; unknown ids are skipped
    pub async fn find_many(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserResponseDto>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        let users: Vec<User> = sqlx::query_as(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(users.into_iter().map(|u| (u.id, u.into())).collect())
    }

    /// Whether a user with this id exists
    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn organization_exists(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM organizations WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    /// Whether `email` belongs to a user other than `except`
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn update(&self, id: Uuid, dto: UpdateUserDto) -> Result<UserResponseDto> {
        if !self.exists(id).await? {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        let email = dto.email.as_deref().map(str::trim);

        let mut errors = Vec::new();
        if let Some(email) = email {
            if self.email_taken(email, Some(id)).await? {
                errors.push(FieldError::new("email", "has already been taken"));
            }
        }
        if let Some(Some(org_id)) = dto.organization_id {
            if !self.organization_exists(org_id).await? {
                errors.push(FieldError::new("organization_id", "does not exist"));
            }
        }
        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        let query = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                organization_id = CASE WHEN $4 THEN $5 ELSE organization_id END,
                avatar_url = COALESCE($6, avatar_url),
                metadata = COALESCE($7, metadata),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user: Option<User> = sqlx::query_as(&query)
            .bind(id)
            .bind(dto.name.as_deref().map(str::trim))
            .bind(email)
            .bind(dto.organization_id.is_some())
            .bind(dto.organization_id.flatten())
            .bind(dto.avatar_url.as_deref())
            .bind(dto.metadata.as_ref())
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)?;

        user.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Hard delete; refused while the user still owns files
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE owner_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if owned > 0 {
            return Err(AppError::Conflict(format!(
                "User {} still owns {} file(s)",
                id, owned
            )));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn create_dto(email: &str) -> CreateUserDto {
        CreateUserDto {
            name: Name().fake(),
            email: email.to_string(),
            organization_id: None,
            avatar_url: None,
            metadata: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_duplicate_email_update_leaves_rows_unchanged(pool: PgPool) {
        let service = UserService::new(pool);
        let first_email: String = SafeEmail().fake();
        let first = service.create(create_dto(&first_email)).await.unwrap();
        let second = service
            .create(create_dto("second@example.com"))
            .await
            .unwrap();

        let err = service
            .update(
                second.id,
                UpdateUserDto {
                    name: Some("Renamed".to_string()),
                    email: Some(first_email.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        match err {
            AppError::InvalidFields(fields) => {
                assert_eq!(fields, vec![FieldError::new("email", "has already been taken")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let first_after = service.get_by_id(first.id).await.unwrap();
        let second_after = service.get_by_id(second.id).await.unwrap();
        assert_eq!(first_after.email, first_email);
        assert_eq!(first_after.name, first.name);
        assert_eq!(second_after.email, "second@example.com");
        assert_eq!(second_after.name, second.name);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_update_keeps_own_email(pool: PgPool) {
        let service = UserService::new(pool);
        let user = service.create(create_dto("self@example.com")).await.unwrap();

        let updated = service
            .update(
                user.id,
                UpdateUserDto {
                    email: Some("self@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "self@example.com");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_create_rejects_duplicate_and_unknown_org(pool: PgPool) {
        let service = UserService::new(pool);
        service.create(create_dto("dup@example.com")).await.unwrap();

        let mut dto = create_dto("dup@example.com");
        dto.organization_id = Some(Uuid::new_v4());
        let err = service.create(dto).await.unwrap_err();

        match err {
            AppError::InvalidFields(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["email", "organization_id"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_find_many_skips_unknown_ids(pool: PgPool) {
        let service = UserService::new(pool);
        let user = service.create(create_dto("many@example.com")).await.unwrap();

        let found = service.find_many(&[user.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[&user.id].email, "many@example.com");
    }
}
