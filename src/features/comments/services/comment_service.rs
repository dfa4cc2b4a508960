use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::comments::dtos::{CommentResponseDto, CreateCommentDto, UpdateCommentDto};
use crate::features::comments::models::Comment;
use crate::features::users::UserService;

const COMMENT_COLUMNS: &str = r#"
    id, file_id, user_id, content, position_x, position_y, is_resolved, created_at, updated_at
"#;

/// Convert database errors raised by comment writes
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // File or author removed between the existence check and the insert
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict("Comment file or author no longer exists".to_string());
        }
    }
    AppError::Database(e)
}

/// Service for comment operations
pub struct CommentService {
    pool: PgPool,
    users: Arc<UserService>,
}

impl CommentService {
    pub fn new(pool: PgPool, users: Arc<UserService>) -> Self {
        Self { pool, users }
    }

    async fn ensure_file_exists(&self, file_id: Uuid) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM files WHERE id = $1)")
                .bind(file_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        if !exists {
            return Err(AppError::NotFound(format!("File {} not found", file_id)));
        }
        Ok(())
    }

    /// Comments of an existing file, newest first
    pub async fn list_for_file(&self, file_id: Uuid) -> Result<Vec<CommentResponseDto>> {
        self.ensure_file_exists(file_id).await?;
        self.comments_of(file_id).await
    }

    /// Comments of a file with their authors, newest first.
    ///
    /// Does not check that the file exists; an unknown id yields an empty list.
    pub async fn comments_of(&self, file_id: Uuid) -> Result<Vec<CommentResponseDto>> {
        let query = format!(
            "SELECT {} FROM comments WHERE file_id = $1 ORDER BY created_at DESC, id",
            COMMENT_COLUMNS
        );
        let comments: Vec<Comment> = sqlx::query_as(&query)
            .bind(file_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(file_id = %file_id, "Failed to list comments: {:?}", e);
                AppError::Database(e)
            })?;

        let mut author_ids: Vec<Uuid> = comments.iter().map(|c| c.user_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors = self.users.find_many(&author_ids).await?;

        Ok(comments
            .into_iter()
            .map(|c| {
                let author = authors.get(&c.user_id).cloned();
                CommentResponseDto::from_comment(c, author)
            })
            .collect())
    }

    pub async fn create(
        &self,
        file_id: Uuid,
        dto: CreateCommentDto,
    ) -> Result<CommentResponseDto> {
        self.ensure_file_exists(file_id).await?;

        let user_id = dto
            .user_id
            .ok_or_else(|| AppError::invalid_field("user_id", "is required"))?;
        let author = self
            .users
            .find_many(&[user_id])
            .await?
            .remove(&user_id)
            .ok_or_else(|| AppError::invalid_field("user_id", "does not exist"))?;

        let query = format!(
            r#"
            INSERT INTO comments (file_id, user_id, content, position_x, position_y)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        );
        let comment: Comment = sqlx::query_as(&query)
            .bind(file_id)
            .bind(user_id)
            .bind(dto.content.trim())
            .bind(dto.position_x)
            .bind(dto.position_y)
            .fetch_one(&self.pool)
            .await
            .map_err(handle_db_error)?;

        tracing::info!(comment_id = %comment.id, file_id = %file_id, "Comment created");
        Ok(CommentResponseDto::from_comment(comment, Some(author)))
    }

    pub async fn update(&self, id: Uuid, dto: UpdateCommentDto) -> Result<CommentResponseDto> {
        let query = format!(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        );
        let comment: Comment = sqlx::query_as(&query)
            .bind(id)
            .bind(dto.content.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))?;

        let author = self
            .users
            .find_many(&[comment.user_id])
            .await?
            .remove(&comment.user_id);

        Ok(CommentResponseDto::from_comment(comment, author))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }

        tracing::info!(comment_id = %id, "Comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::seed_file;

    fn service(pool: PgPool) -> CommentService {
        CommentService::new(pool.clone(), Arc::new(UserService::new(pool)))
    }

    fn comment(user_id: Uuid, content: &str) -> CreateCommentDto {
        CreateCommentDto {
            user_id: Some(user_id),
            content: content.to_string(),
            position_x: Some(1.5),
            position_y: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_list_newest_first_with_authors(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        let service = service(pool);

        let first = service
            .create(seeded.file_id, comment(seeded.user_id, "first"))
            .await
            .unwrap();
        let second = service
            .create(seeded.file_id, comment(seeded.user_id, "second"))
            .await
            .unwrap();

        let listed = service.list_for_file(seeded.file_id).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert!(listed
            .iter()
            .all(|c| c.user.as_ref().map(|u| u.id) == Some(seeded.user_id)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_missing_file_and_author(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        let service = service(pool);

        assert!(matches!(
            service.list_for_file(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service
                .create(Uuid::new_v4(), comment(seeded.user_id, "orphan"))
                .await,
            Err(AppError::NotFound(_))
        ));

        let err = service
            .create(seeded.file_id, comment(Uuid::new_v4(), "ghost"))
            .await
            .unwrap_err();
        match err {
            AppError::InvalidFields(fields) => {
                assert_eq!(fields[0].to_string(), "user_id: does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_update_and_delete(pool: PgPool) {
        let seeded = seed_file(&pool).await;
        let service = service(pool);
        let created = service
            .create(seeded.file_id, comment(seeded.user_id, "draft"))
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                UpdateCommentDto {
                    content: "final".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content, "final");
        assert_eq!(updated.position_x, Some(1.5));

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.delete(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
