//! Ideas database operations

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::PostRepository;
use crate::error::{AppError, Result};

/// Idea record: a note on a highlighted quote, anchored to a paragraph
/// position within its post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Idea {
    pub id: String,
    pub post_id: String,
    pub position: i64,
    pub quote: String,
    pub note: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Create idea request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIdea {
    pub position: i64,
    pub quote: String,
    pub note: String,
}

/// Update idea request (only quote and note are mutable)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateIdea {
    pub quote: Option<String>,
    pub note: Option<String>,
}

/// Idea repository
pub struct IdeaRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> IdeaRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific idea
    pub async fn get(&self, id: &str) -> Result<Option<Idea>> {
        let idea = sqlx::query_as::<_, Idea>(
            r#"
            SELECT id, post_id, position, quote, note, created_at, updated_at
            FROM ideas
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(idea)
    }

    /// List ideas for a post, in paragraph order
    pub async fn list_for_post(&self, post_id: &str) -> Result<Vec<Idea>> {
        let ideas = sqlx::query_as::<_, Idea>(
            r#"
            SELECT id, post_id, position, quote, note, created_at, updated_at
            FROM ideas
            WHERE post_id = ?
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ideas)
    }

    /// List all ideas, newest first
    pub async fn list(&self) -> Result<Vec<Idea>> {
        let ideas = sqlx::query_as::<_, Idea>(
            r#"
            SELECT id, post_id, position, quote, note, created_at, updated_at
            FROM ideas
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(ideas)
    }

    /// Create a new idea. The referenced paragraph position must exist for
    /// the post.
    pub async fn create(&self, post_id: &str, data: &CreateIdea) -> Result<Idea> {
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

        sqlx::query(
            r#"
            INSERT INTO ideas (id, post_id, position, quote, note, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(post_id)
        .bind(data.position)
        .bind(&data.quote)
        .bind(&data.note)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created idea".to_string()))
    }

    /// Update an idea's quote and/or note
    pub async fn update(&self, id: &str, data: &UpdateIdea) -> Result<Option<Idea>> {
        let now = Utc::now().to_rfc3339();

        let mut set_clauses = vec!["updated_at = ?".to_string()];
        let mut binds: Vec<String> = vec![now.clone()];

        if let Some(ref quote) = data.quote {
            set_clauses.push("quote = ?".to_string());
            binds.push(quote.clone());
        }

        if let Some(ref note) = data.note {
            set_clauses.push("note = ?".to_string());
            binds.push(note.clone());
        }

        let query = format!("UPDATE ideas SET {} WHERE id = ?", set_clauses.join(", "));

        let mut sql_query = sqlx::query(&query);
        for bind in binds {
            sql_query = sql_query.bind(bind);
        }
        sql_query = sql_query.bind(id);

        sql_query.execute(self.pool).await?;

        self.get(id).await
    }

    /// Delete an idea
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ideas WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
