//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Posts table (one post per uploaded book page)
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    author TEXT NOT NULL DEFAULT 'Anonymous',
    image_name TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at);

-- Paragraphs table
-- position is the 1-based segmentation order; dense per post, never
-- renumbered after creation, and doubles as the externally visible id.
CREATE TABLE IF NOT EXISTS paragraphs (
    post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    text TEXT NOT NULL,
    PRIMARY KEY (post_id, position)
);

-- Ideas table (quote + note anchored to a paragraph position)
CREATE TABLE IF NOT EXISTS ideas (
    id TEXT PRIMARY KEY,
    post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    quote TEXT NOT NULL,
    note TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (post_id, position) REFERENCES paragraphs(post_id, position) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_ideas_post_id ON ideas(post_id);

-- Underlines table (highlighted span anchored to a paragraph position)
CREATE TABLE IF NOT EXISTS underlines (
    id TEXT PRIMARY KEY,
    post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    text TEXT NOT NULL,
    color TEXT NOT NULL DEFAULT 'yellow',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (post_id, position) REFERENCES paragraphs(post_id, position) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_underlines_post_id ON underlines(post_id);
"#;
