//! Ideas API routes
//!
//! Endpoints:
//! - GET    /api/ideas?post={post_id}  - List ideas (optionally for one post)
//! - POST   /api/ideas                 - Create an idea on a paragraph
//! - PUT    /api/ideas/:id             - Update quote/note
//! - DELETE /api/ideas/:id             - Delete an idea

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{CreateIdea, Idea, IdeaRepository, UpdateIdea};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the ideas router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ideas))
        .route("/", post(create_idea))
        .route("/:id", put(update_idea))
        .route("/:id", delete(delete_idea))
}

/// Idea as exposed over the API; `paragraphId` is the anchored paragraph's
/// stable position within its post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaBody {
    pub id: String,
    pub post_id: String,
    pub paragraph_id: i64,
    pub quote: String,
    pub note: String,
    pub timestamp: String,
}

impl From<Idea> for IdeaBody {
    fn from(idea: Idea) -> Self {
        Self {
            id: idea.id,
            post_id: idea.post_id,
            paragraph_id: idea.position,
            quote: idea.quote,
            note: idea.note,
            timestamp: idea.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    post: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIdeaRequest {
    post_id: String,
    paragraph_id: i64,
    quote: String,
    note: String,
}

/// List ideas, filtered by post when `?post=` is given
async fn list_ideas(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<IdeaBody>>> {
    let repo = IdeaRepository::new(&state.pool);
    let ideas = match query.post {
        Some(post_id) => repo.list_for_post(&post_id).await?,
        None => repo.list().await?,
    };

    Ok(Json(ideas.into_iter().map(IdeaBody::from).collect()))
}

/// Create a new idea anchored to a paragraph
async fn create_idea(
    State(state): State<AppState>,
    Json(data): Json<CreateIdeaRequest>,
) -> Result<(StatusCode, Json<IdeaBody>)> {
    let repo = IdeaRepository::new(&state.pool);
    let idea = repo
        .create(
            &data.post_id,
            &CreateIdea {
                position: data.paragraph_id,
                quote: data.quote,
                note: data.note,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(IdeaBody::from(idea))))
}

/// Update an idea's quote and/or note
async fn update_idea(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateIdea>,
) -> Result<Json<IdeaBody>> {
    let repo = IdeaRepository::new(&state.pool);
    let idea = repo
        .update(&id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Idea not found: {}", id)))?;

    Ok(Json(IdeaBody::from(idea)))
}

/// Delete an idea
async fn delete_idea(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let repo = IdeaRepository::new(&state.pool);
    let deleted = repo.delete(&id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Idea not found: {}", id)))
    }
}
