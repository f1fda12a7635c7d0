//! Posts API routes
//!
//! Endpoints:
//! - GET    /api/posts           - List all posts
//! - POST   /api/posts/upload    - Upload a page image, OCR + segment, create post
//! - GET    /api/posts/:id       - Post with paragraphs, ideas, underlines
//! - PUT    /api/posts/:id       - Update title/author
//! - DELETE /api/posts/:id       - Delete post (annotations cascade)

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::{IdeaRepository, PostRepository, UnderlineRepository, UpdatePost};
use crate::error::{AppError, Result};
use crate::state::AppState;

use super::ideas::IdeaBody;
use super::publish_date;
use super::underlines::UnderlineBody;

/// Maximum accepted image size (10 MB)
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Create the posts router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/upload", post(upload_post))
        .route("/:id", get(get_post))
        .route("/:id", put(update_post))
        .route("/:id", delete(delete_post))
        // Multipart bodies carry the image plus form fields; leave headroom
        // over the image limit itself.
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024))
}

/// Post list entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub author: String,
    pub publish_date: String,
    pub image_url: String,
}

/// Externally visible paragraph: id equals the stable 1-based position.
#[derive(Debug, Serialize)]
pub struct ParagraphBody {
    pub id: i64,
    pub text: String,
}

/// Full post body with nested paragraphs and annotations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: String,
    pub title: String,
    pub author: String,
    pub publish_date: String,
    pub image_url: String,
    pub content: Vec<ParagraphBody>,
    pub ideas: Vec<IdeaBody>,
    pub underlines: Vec<UnderlineBody>,
}

/// List all posts
async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostSummary>>> {
    let repo = PostRepository::new(&state.pool);
    let posts = repo.list().await?;

    let summaries = posts
        .into_iter()
        .map(|p| PostSummary {
            publish_date: publish_date(&p.created_at),
            id: p.id,
            title: p.title,
            author: p.author,
            image_url: p.image_name,
        })
        .collect();

    Ok(Json(summaries))
}

/// Upload a book page image and create a post from it.
///
/// Multipart fields: `image` (required), `title`, `author` (optional).
/// Extraction runs to completion before segmentation; the post and its
/// paragraph batch are persisted in one transaction. A page that yields zero
/// paragraphs still creates a post.
async fn upload_post(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PostDetail>)> {
    let mut image: Option<(Vec<u8>, String, String)> = None;
    let mut title: Option<String> = None;
    let mut author: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let content_type = field.content_type().unwrap_or("").to_string();
                if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
                    return Err(AppError::BadRequest(format!(
                        "Unsupported file type '{}'. Allowed: {}",
                        content_type,
                        ALLOWED_IMAGE_TYPES.join(", ")
                    )));
                }
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await?;
                if bytes.len() > MAX_IMAGE_SIZE {
                    return Err(AppError::BadRequest(
                        "Image file too large (max 10MB)".to_string(),
                    ));
                }
                image = Some((bytes.to_vec(), content_type, file_name));
            }
            "title" => title = Some(field.text().await?),
            "author" => author = Some(field.text().await?),
            _ => {}
        }
    }

    let (image_bytes, mime_type, file_name) =
        image.ok_or_else(|| AppError::BadRequest("Missing 'image' field".to_string()))?;

    // The buffered image lives only for the duration of this call; it is
    // dropped on every exit path, extractor failure included.
    let page = state
        .pipeline
        .process(&image_bytes, &mime_type, title.as_deref())
        .await?;

    let repo = PostRepository::new(&state.pool);
    let created = repo
        .create_with_paragraphs(
            &page.title,
            author.as_deref().unwrap_or("Anonymous"),
            &file_name,
            &page.paragraphs,
        )
        .await?;

    tracing::info!(
        post_id = %created.id,
        paragraphs = page.paragraphs.len(),
        "Post created from upload"
    );

    let detail = load_detail(&state.pool, &created.id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Get a single post with all paragraphs and annotations
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostDetail>> {
    let detail = load_detail(&state.pool, &id).await?;
    Ok(Json(detail))
}

/// Update a post's title and/or author
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdatePost>,
) -> Result<Json<PostDetail>> {
    let repo = PostRepository::new(&state.pool);
    repo.update(&id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post not found: {}", id)))?;

    let detail = load_detail(&state.pool, &id).await?;
    Ok(Json(detail))
}

/// Delete a post and everything anchored to it
async fn delete_post(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let repo = PostRepository::new(&state.pool);
    let deleted = repo.delete(&id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Post not found: {}", id)))
    }
}

/// Assemble the full post body
async fn load_detail(pool: &SqlitePool, id: &str) -> Result<PostDetail> {
    let posts = PostRepository::new(pool);
    let post = posts
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post not found: {}", id)))?;

    let content = posts
        .paragraphs(id)
        .await?
        .into_iter()
        .map(|p| ParagraphBody {
            id: p.position,
            text: p.text,
        })
        .collect();

    let ideas = IdeaRepository::new(pool)
        .list_for_post(id)
        .await?
        .into_iter()
        .map(IdeaBody::from)
        .collect();

    let underlines = UnderlineRepository::new(pool)
        .list_for_post(id)
        .await?
        .into_iter()
        .map(UnderlineBody::from)
        .collect();

    Ok(PostDetail {
        publish_date: publish_date(&post.created_at),
        id: post.id,
        title: post.title,
        author: post.author,
        image_url: post.image_name,
        content,
        ideas,
        underlines,
    })
}
