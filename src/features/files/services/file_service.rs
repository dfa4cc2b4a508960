use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, FieldError, Result};
use crate::core::extractor::ClientMeta;
use crate::features::activity_logs::{ActivityAction, ActivityLogService, NewActivityLog};
use crate::features::comments::CommentService;
use crate::features::files::dtos::{
    CreateFileDto, FileDetailDto, FileListItemDto, FileQueryParams, FileWithRelationsDto,
    UpdateFileDto, ViewFileResponseDto,
};
use crate::features::files::models::{File, FileListRow};
use crate::features::organizations::OrganizationService;
use crate::features::users::UserService;
use crate::shared::constants::DEFAULT_FILE_PAGE_SIZE;

const FILE_COLUMNS: &str = r#"
    id, name, owner_id, organization_id, version, is_public, view_count,
    last_modified, metadata, created_at, updated_at
"#;

/// Shared WHERE clause of the list and count queries
const LIST_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR f.owner_id = $1)
      AND ($2::uuid IS NULL OR f.organization_id = $2)
      AND ($3::text IS NULL OR f.name ILIKE $3)
"#;

/// Convert database errors raised by file writes
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // Owner or organization deleted after the existence check
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict("File owner or organization no longer exists".to_string());
        }
    }
    AppError::Database(e)
}

/// Service for file operations
pub struct FileService {
    pool: PgPool,
    users: Arc<UserService>,
    organizations: Arc<OrganizationService>,
    comments: Arc<CommentService>,
}

impl FileService {
    pub fn new(
        pool: PgPool,
        users: Arc<UserService>,
        organizations: Arc<OrganizationService>,
        comments: Arc<CommentService>,
    ) -> Self {
        Self {
            pool,
            users,
            organizations,
            comments,
        }
    }

    /// List files matching every given filter, with owner and organization
    pub async fn list(&self, params: &FileQueryParams) -> Result<(Vec<FileListItemDto>, i64)> {
        let search = params.search_pattern();

        let count_query = format!("SELECT COUNT(*) FROM files f {}", LIST_FILTER);
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(params.owner_id)
            .bind(params.organization_id)
            .bind(search.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count files: {:?}", e);
                AppError::Database(e)
            })?;

        // Sort column and direction come from closed enums, never from raw input
        let direction = params.sort_order.as_sql();
        let query = format!(
            r#"
            SELECT
                f.id, f.name, f.owner_id, f.organization_id, f.version, f.is_public,
                f.view_count, f.last_modified, f.metadata, f.created_at, f.updated_at,
                u.name AS owner_name,
                u.email AS owner_email,
                o.name AS organization_name
            FROM files f
            JOIN users u ON u.id = f.owner_id
            JOIN organizations o ON o.id = f.organization_id
            {filter}
            ORDER BY {column} {direction}, f.id {direction}
            LIMIT $4 OFFSET $5
            "#,
            filter = LIST_FILTER,
            column = params.sort_by.as_sql(),
            direction = direction,
        );

        let page = params.pagination();
        let rows: Vec<FileListRow> = sqlx::query_as(&query)
            .bind(params.owner_id)
            .bind(params.organization_id)
            .bind(search.as_deref())
            .bind(page.limit(DEFAULT_FILE_PAGE_SIZE))
            .bind(page.offset(DEFAULT_FILE_PAGE_SIZE))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list files: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Files owned by an existing user; the user id replaces any `owner_id` filter
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        params: FileQueryParams,
    ) -> Result<(Vec<FileListItemDto>, i64)> {
        if !self.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        let params = FileQueryParams {
            owner_id: Some(user_id),
            ..params
        };
        self.list(&params).await
    }

    /// Create a file and its `created` log entry atomically
    pub async fn create(
        &self,
        dto: CreateFileDto,
        client: ClientMeta,
    ) -> Result<FileWithRelationsDto> {
        let owner_id = dto
            .owner_id
            .ok_or_else(|| AppError::invalid_field("owner_id", "is required"))?;
        let organization_id = dto
            .organization_id
            .ok_or_else(|| AppError::invalid_field("organization_id", "is required"))?;

        let mut errors = Vec::new();
        if !self.users.exists(owner_id).await? {
            errors.push(FieldError::new("owner_id", "does not exist"));
        }
        if !self.organizations.exists(organization_id).await? {
            errors.push(FieldError::new("organization_id", "does not exist"));
        }
        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let query = format!(
            r#"
            INSERT INTO files (name, owner_id, organization_id, is_public, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            FILE_COLUMNS
        );
        let file: File = sqlx::query_as(&query)
            .bind(dto.name.trim())
            .bind(owner_id)
            .bind(organization_id)
            .bind(dto.is_public.unwrap_or(false))
            .bind(dto.metadata)
            .fetch_one(&mut *tx)
            .await
            .map_err(handle_db_error)?;

        let entry = NewActivityLog::new(ActivityAction::Created, file.id, Some(owner_id), client);
        ActivityLogService::append(&mut *tx, &entry).await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(file_id = %file.id, owner_id = %owner_id, "File created");
        self.with_relations(file).await
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<FileDetailDto> {
        let file = self
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

        let (file, comments) =
            tokio::try_join!(self.with_relations(file), self.comments.comments_of(id))?;

        Ok(FileDetailDto::new(file, comments))
    }

    /// Apply an edit, bump the version and log it, all in one transaction
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateFileDto,
        client: ClientMeta,
    ) -> Result<FileWithRelationsDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let query = format!(
            r#"
            UPDATE files
            SET name = COALESCE($2, name),
                is_public = COALESCE($3, is_public),
                metadata = COALESCE($4, metadata),
                version = version + 1,
                last_modified = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FILE_COLUMNS
        );
        let file: File = sqlx::query_as(&query)
            .bind(id)
            .bind(dto.name.as_deref().map(str::trim))
            .bind(dto.is_public)
            .bind(dto.metadata.as_ref())
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

        let entry =
            NewActivityLog::new(ActivityAction::Edited, file.id, Some(file.owner_id), client);
        ActivityLogService::append(&mut *tx, &entry).await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(file_id = %file.id, version = file.version, "File edited");
        self.with_relations(file).await
    }

    /// Hard delete; comments and activity logs go with the file
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("File {} not found", id)));
        }

        tracing::info!(file_id = %id, "File deleted");
        Ok(())
    }

    /// Count one view.
    ///
    /// The increment is a single statement so concurrent views never lose
    /// updates. A missing file is reported as ignored rather than an error.
    pub async fn increment_view(
        &self,
        id: Uuid,
        viewer_id: Option<Uuid>,
        client: ClientMeta,
    ) -> Result<ViewFileResponseDto> {
        let view_count: Option<i64> = sqlx::query_scalar(
            "UPDATE files SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let Some(view_count) = view_count else {
            tracing::debug!(file_id = %id, "View ignored for missing file");
            return Ok(ViewFileResponseDto::ignored());
        };

        let entry = NewActivityLog::new(ActivityAction::Viewed, id, viewer_id, client);
        ActivityLogService::append(&self.pool, &entry)
            .await
            .map_err(|e| match e {
                // File deleted between the increment and the log insert
                AppError::Database(db) => handle_db_error(db),
                other => other,
            })?;

        Ok(ViewFileResponseDto::counted(view_count))
    }

    async fn find(&self, id: Uuid) -> Result<Option<File>> {
        let query = format!("SELECT {} FROM files WHERE id = $1", FILE_COLUMNS);
        sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn with_relations(&self, file: File) -> Result<FileWithRelationsDto> {
        let (owner, organization) = tokio::try_join!(
            self.users.get_by_id(file.owner_id),
            self.organizations.get_by_id(file.organization_id)
        )?;
        Ok(FileWithRelationsDto::new(file, owner, organization))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::dtos::FileSortBy;
    use crate::shared::test_helpers::{seed_file, Seeded};
    use crate::shared::types::SortDirection;

    fn service(pool: PgPool) -> FileService {
        let users = Arc::new(UserService::new(pool.clone()));
        let organizations = Arc::new(OrganizationService::new(pool.clone()));
        let comments = Arc::new(CommentService::new(pool.clone(), users.clone()));
        FileService::new(pool, users, organizations, comments)
    }

    fn create_dto(seeded: &Seeded, name: &str) -> CreateFileDto {
        CreateFileDto {
            name: name.to_string(),
            owner_id: Some(seeded.user_id),
            organization_id: Some(seeded.organization_id),
            is_public: None,
            metadata: None,
        }
    }

    fn client() -> ClientMeta {
        ClientMeta {
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: Some("test-agent".to_string()),
        }
    }

    async fn log_actions(pool: &PgPool, file_id: Uuid) -> Vec<ActivityAction> {
        ActivityLogService::list_for_file(pool, file_id)
            .await
            .unwrap()
            .into_iter()
            .map(|log| log.action)
            .collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_create_writes_one_created_log(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        let service = service(pool.clone());

        let file = service
            .create(create_dto(&seeded, "Onboarding"), client())
            .await
            .unwrap();

        assert_eq!(file.version, 1);
        assert_eq!(file.view_count, 0);
        assert!(!file.is_public);
        assert_eq!(file.owner.id, seeded.user_id);
        assert_eq!(file.organization.id, seeded.organization_id);

        let logs = ActivityLogService::list_for_file(&pool, file.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, ActivityAction::Created);
        assert_eq!(logs[0].user_id, Some(seeded.user_id));
        assert_eq!(logs[0].ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(logs[0].user_agent.as_deref(), Some("test-agent"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_failed_log_rolls_back_file(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        let service = service(pool.clone());

        // ip_address is VARCHAR(45); a longer value fails the log insert
        let client = ClientMeta {
            ip_address: Some("x".repeat(60)),
            user_agent: None,
        };
        let err = service
            .create(create_dto(&seeded, "Never persisted"), client)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE name = $1")
            .bind("Never persisted")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_create_rejects_unknown_owner_and_organization(pool: PgPool) {
        let service = service(pool);
        let err = service
            .create(
                CreateFileDto {
                    name: "Orphan".to_string(),
                    owner_id: Some(Uuid::new_v4()),
                    organization_id: Some(Uuid::new_v4()),
                    is_public: Some(true),
                    metadata: None,
                },
                ClientMeta::default(),
            )
            .await
            .unwrap_err();

        match err {
            AppError::InvalidFields(fields) => {
                assert_eq!(
                    fields,
                    vec![
                        FieldError::new("owner_id", "does not exist"),
                        FieldError::new("organization_id", "does not exist"),
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_update_bumps_version_and_logs_edit(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        sqlx::query("UPDATE files SET last_modified = NOW() - INTERVAL '1 hour' WHERE id = $1")
            .bind(seeded.file_id)
            .execute(&pool)
            .await
            .unwrap();
        let service = service(pool.clone());
        let before = service.get_detail(seeded.file_id).await.unwrap();

        let updated = service
            .update(
                seeded.file_id,
                UpdateFileDto {
                    name: Some("Landing page v2".to_string()),
                    ..Default::default()
                },
                client(),
            )
            .await
            .unwrap();

        assert_eq!(updated.version, before.version + 1);
        assert_eq!(updated.name, "Landing page v2");
        assert!(updated.last_modified > before.last_modified);
        assert_eq!(log_actions(&pool, seeded.file_id).await, vec![ActivityAction::Edited]);

        let missing = service
            .update(Uuid::new_v4(), UpdateFileDto::default(), client())
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
        let total_logs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total_logs, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_concurrent_views_are_all_counted(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        let service = Arc::new(service(pool.clone()));
        let (file_id, user_id) = (seeded.file_id, seeded.user_id);
        let views: i64 = 25;

        let results = futures::future::join_all((0..views).map(|_| {
            let service = service.clone();
            async move {
                service
                    .increment_view(file_id, Some(user_id), ClientMeta::default())
                    .await
            }
        }))
        .await;
        assert!(results.iter().all(|r| matches!(r, Ok(v) if !v.ignored)));

        let detail = service.get_detail(seeded.file_id).await.unwrap();
        assert_eq!(detail.view_count, views);
        assert_eq!(log_actions(&pool, seeded.file_id).await.len(), views as usize);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_view_of_missing_file_is_ignored(pool: PgPool) {
        let service = service(pool.clone());

        let outcome = service
            .increment_view(Uuid::new_v4(), None, ClientMeta::default())
            .await
            .unwrap();
        assert_eq!(outcome, ViewFileResponseDto::ignored());

        let logs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(logs, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_view_with_unknown_viewer_records_null(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        let service = service(pool.clone());

        let outcome = service
            .increment_view(seeded.file_id, Some(Uuid::new_v4()), ClientMeta::default())
            .await
            .unwrap();
        assert_eq!(outcome, ViewFileResponseDto::counted(1));

        let logs = ActivityLogService::list_for_file(&pool, seeded.file_id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_search_and_filters_are_conjunctive(pool: PgPool) {
        let a = seed_file(&pool).await;
        let b = seed_file(&pool).await;
        let service = service(pool);

        service.create(create_dto(&a, "Mobile Checkout"), client()).await.unwrap();
        service.create(create_dto(&b, "checkout redesign"), client()).await.unwrap();
        service.create(create_dto(&a, "100%_done"), client()).await.unwrap();

        let search = |term: &str, owner_id: Option<Uuid>| FileQueryParams {
            search: Some(term.to_string()),
            owner_id,
            sort_by: FileSortBy::Name,
            sort_order: SortDirection::Asc,
            ..Default::default()
        };

        let (items, total) = service.list(&search("CHECKOUT", None)).await.unwrap();
        assert_eq!(total, 2);
        let mut names: Vec<_> = items.iter().map(|f| f.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Mobile Checkout", "checkout redesign"]);

        let (items, total) = service
            .list(&search("checkout", Some(a.user_id)))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].owner.id, a.user_id);
        assert_eq!(items[0].organization.id, a.organization_id);

        // Wildcards in the term match literally
        let (_, total) = service.list(&search("%_", None)).await.unwrap();
        assert_eq!(total, 1);

        let (_, total) = service
            .list_for_user(b.user_id, FileQueryParams::default())
            .await
            .unwrap();
        assert_eq!(total, 2);

        assert!(matches!(
            service
                .list_for_user(Uuid::new_v4(), FileQueryParams::default())
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_delete_cascades_comments_and_logs(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        let service = service(pool.clone());
        service
            .increment_view(seeded.file_id, None, ClientMeta::default())
            .await
            .unwrap();

        service.delete(seeded.file_id).await.unwrap();

        assert!(log_actions(&pool, seeded.file_id).await.is_empty());
        assert!(matches!(
            service.get_detail(seeded.file_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(seeded.file_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_search_keeps_surrounding_whitespace(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        let service = service(pool);
        service.create(create_dto(&seeded, "Footer v2"), client()).await.unwrap();
        service.create(create_dto(&seeded, "Footerv2"), client()).await.unwrap();

        let params = FileQueryParams {
            search: Some(" v2".to_string()),
            ..Default::default()
        };
        let (items, total) = service.list(&params).await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(items[0].name, "Footer v2");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_page_far_past_the_end_is_empty(pool: PgPool) {
        seed_file(&pool).await;
        let service = service(pool);

        let params = FileQueryParams {
            page: Some(i64::MAX),
            ..Default::default()
        };
        let (items, total) = service.list(&params).await.unwrap();

        assert!(items.is_empty());
        assert_eq!(total, 1);
    }
}
