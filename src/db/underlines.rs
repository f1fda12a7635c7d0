//! Underlines database operations

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::PostRepository;
use crate::error::{AppError, Result};

/// Underline record: a highlighted span anchored to a paragraph position.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Underline {
    pub id: String,
    pub post_id: String,
    pub position: i64,
    pub text: String,
    pub color: String,
    pub created_at: String,
}

/// Create underline request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUnderline {
    pub position: i64,
    pub text: String,
    pub color: Option<String>,
}

/// Underline repository
pub struct UnderlineRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UnderlineRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific underline
    pub async fn get(&self, id: &str) -> Result<Option<Underline>> {
        let underline = sqlx::query_as::<_, Underline>(
            r#"
            SELECT id, post_id, position, text, color, created_at
            FROM underlines
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(underline)
    }

    /// List underlines for a post, in paragraph order
    pub async fn list_for_post(&self, post_id: &str) -> Result<Vec<Underline>> {
        let underlines = sqlx::query_as::<_, Underline>(
            r#"
            SELECT id, post_id, position, text, color, created_at
            FROM underlines
            WHERE post_id = ?
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        Ok(underlines)
    }

    /// List all underlines, newest first
    pub async fn list(&self) -> Result<Vec<Underline>> {
        let underlines = sqlx::query_as::<_, Underline>(
            r#"
            SELECT id, post_id, position, text, color, created_at
            FROM underlines
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(underlines)
    }

    /// Create a new underline. The referenced paragraph position must exist
    /// for the post.
    pub async fn create(&self, post_id: &str, data: &CreateUnderline) -> Result<Underline> {
        let posts = PostRepository::new(self.pool);

        if posts.get(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Post not found: {}", post_id)));
        }

        if !posts.paragraph_exists(post_id, data.position).await? {
            return Err(AppError::BadRequest(format!(
                "Paragraph {} not found in this post",
                data.position
            )));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let color = data.color.as_deref().unwrap_or("yellow");

        sqlx::query(
            r#"
            INSERT INTO underlines (id, post_id, position, text, color, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(post_id)
        .bind(data.position)
        .bind(&data.text)
        .bind(color)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created underline".to_string()))
    }

    /// Delete an underline
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM underlines WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
