//! Comment repository for database operations

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::{CommentStore, StoreResult};
use crate::models::{
    RecordId,
    comment::{Comment, NewComment},
};

/// Comment repository
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new comment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn comment_from_row(row: &PgRow) -> StoreResult<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        record: row.try_get("record_id")?,
        user: row.try_get("user_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CommentStore for CommentRepository {
    async fn create(&self, comment: NewComment) -> StoreResult<Comment> {
        let row = sqlx::query(
            r#"
            INSERT INTO comments (id, record_id, user_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, record_id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(comment.record)
        .bind(comment.user)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        comment_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, record_id, user_id, content, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn list_by_record(&self, record: RecordId) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, record_id, user_id, content, created_at, updated_at
            FROM comments
            WHERE record_id = $1
            ORDER BY created_at ASC, id
            "#,
        )
        .bind(record)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
