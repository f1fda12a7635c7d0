//! Posts and paragraphs database operations
//!
//! Paragraphs are created once, atomically, as a batch right after
//! segmentation and are immutable afterwards. Nothing here mutates paragraph
//! text or renumbers positions; paragraphs die only with their owning post.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Post record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: String,
    pub image_name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Paragraph record; `position` is dense 1..N per post in segmentation order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Paragraph {
    pub post_id: String,
    pub position: i64,
    pub text: String,
}

/// Update post request (only title and author are mutable)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Post repository
pub struct PostRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific post
    pub async fn get(&self, id: &str) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, author, image_name, created_at, updated_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(post)
    }

    /// List all posts, newest first
    pub async fn list(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, author, image_name, created_at, updated_at
            FROM posts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(posts)
    }

    /// Create a post together with its paragraph batch in one transaction.
    ///
    /// Positions are assigned 1..N in the given slice order, which is the
    /// segmentation order. An empty slice is valid: the post is created with
    /// no paragraphs.
    pub async fn create_with_paragraphs(
        &self,
        title: &str,
        author: &str,
        image_name: &str,
        paragraphs: &[String],
    ) -> Result<Post> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO posts (id, title, author, image_name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(title)
        .bind(author)
        .bind(image_name)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        for (idx, text) in paragraphs.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO paragraphs (post_id, position, text)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind((idx + 1) as i64)
            .bind(text)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created post".to_string()))
    }

    /// List a post's paragraphs in position order
    pub async fn paragraphs(&self, post_id: &str) -> Result<Vec<Paragraph>> {
        let paragraphs = sqlx::query_as::<_, Paragraph>(
            r#"
            SELECT post_id, position, text
            FROM paragraphs
            WHERE post_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        Ok(paragraphs)
    }

    /// Whether a paragraph position exists for a post. Positions are dense
    /// starting at 1, so this is effectively a range check.
    pub async fn paragraph_exists(&self, post_id: &str, position: i64) -> Result<bool> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM paragraphs
            WHERE post_id = ? AND position = ?
            "#,
        )
        .bind(post_id)
        .bind(position)
        .fetch_one(self.pool)
        .await?;

        Ok(result.0 > 0)
    }

    /// Update a post's title and/or author
    pub async fn update(&self, id: &str, data: &UpdatePost) -> Result<Option<Post>> {
        let now = Utc::now().to_rfc3339();

        // Build dynamic update query
        let mut set_clauses = vec!["updated_at = ?".to_string()];
        let mut binds: Vec<String> = vec![now.clone()];

        if let Some(ref title) = data.title {
            set_clauses.push("title = ?".to_string());
            binds.push(title.clone());
        }

        if let Some(ref author) = data.author {
            set_clauses.push("author = ?".to_string());
            binds.push(author.clone());
        }

        let query = format!("UPDATE posts SET {} WHERE id = ?", set_clauses.join(", "));

        let mut sql_query = sqlx::query(&query);
        for bind in binds {
            sql_query = sql_query.bind(bind);
        }
        sql_query = sql_query.bind(id);

        sql_query.execute(self.pool).await?;

        self.get(id).await
    }

    /// Delete a post; paragraphs, ideas and underlines cascade with it
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_assigns_dense_positions_in_order() {
        let pool = test_pool().await;
        let repo = PostRepository::new(&pool);

        let texts: Vec<String> = vec![
            "First paragraph of the scanned page.".to_string(),
            "Second paragraph of the scanned page.".to_string(),
            "Third paragraph of the scanned page.".to_string(),
        ];
        let post = repo
            .create_with_paragraphs("A Title", "Anonymous", "page.jpg", &texts)
            .await
            .unwrap();

        let paragraphs = repo.paragraphs(&post.id).await.unwrap();
        assert_eq!(paragraphs.len(), 3);
        for (idx, p) in paragraphs.iter().enumerate() {
            assert_eq!(p.position, (idx + 1) as i64);
            assert_eq!(p.text, texts[idx]);
        }
    }

    #[tokio::test]
    async fn test_create_with_no_paragraphs_is_valid() {
        let pool = test_pool().await;
        let repo = PostRepository::new(&pool);

        let post = repo
            .create_with_paragraphs("Untitled Post", "Anonymous", "", &[])
            .await
            .unwrap();

        assert!(repo.paragraphs(&post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_paragraph_exists_is_a_range_check() {
        let pool = test_pool().await;
        let repo = PostRepository::new(&pool);

        let post = repo
            .create_with_paragraphs(
                "T",
                "A",
                "",
                &["Only one paragraph long enough here.".to_string()],
            )
            .await
            .unwrap();

        assert!(repo.paragraph_exists(&post.id, 1).await.unwrap());
        assert!(!repo.paragraph_exists(&post.id, 0).await.unwrap());
        assert!(!repo.paragraph_exists(&post.id, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_touches_only_title_and_author() {
        let pool = test_pool().await;
        let repo = PostRepository::new(&pool);

        let post = repo
            .create_with_paragraphs("Old", "Anonymous", "img.png", &[])
            .await
            .unwrap();

        let updated = repo
            .update(
                &post.id,
                &UpdatePost {
                    title: Some("New".to_string()),
                    author: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.author, "Anonymous");
        assert_eq!(updated.image_name, "img.png");
        assert_eq!(updated.created_at, post.created_at);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_paragraphs() {
        let pool = test_pool().await;
        let repo = PostRepository::new(&pool);

        let post = repo
            .create_with_paragraphs(
                "T",
                "A",
                "",
                &["A paragraph that is long enough to keep.".to_string()],
            )
            .await
            .unwrap();

        assert!(repo.delete(&post.id).await.unwrap());
        assert!(repo.get(&post.id).await.unwrap().is_none());
        assert!(repo.paragraphs(&post.id).await.unwrap().is_empty());
    }
}
