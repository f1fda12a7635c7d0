//! Underlines API routes
//!
//! Endpoints:
//! - GET    /api/underlines?post={post_id}  - List underlines
//! - POST   /api/underlines                 - Create an underline
//! - DELETE /api/underlines/:id             - Delete an underline

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{CreateUnderline, Underline, UnderlineRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the underlines router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_underlines))
        .route("/", post(create_underline))
        .route("/:id", delete(delete_underline))
}

/// Underline as exposed over the API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderlineBody {
    pub id: String,
    pub post_id: String,
    pub paragraph_id: i64,
    pub text: String,
    pub color: String,
    pub timestamp: String,
}

impl From<Underline> for UnderlineBody {
    fn from(underline: Underline) -> Self {
        Self {
            id: underline.id,
            post_id: underline.post_id,
            paragraph_id: underline.position,
            text: underline.text,
            color: underline.color,
            timestamp: underline.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    post: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUnderlineRequest {
    post_id: String,
    paragraph_id: i64,
    text: String,
    color: Option<String>,
}

/// List underlines, filtered by post when `?post=` is given
async fn list_underlines(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<UnderlineBody>>> {
    let repo = UnderlineRepository::new(&state.pool);
    let underlines = match query.post {
        Some(post_id) => repo.list_for_post(&post_id).await?,
        None => repo.list().await?,
    };

    Ok(Json(
        underlines.into_iter().map(UnderlineBody::from).collect(),
    ))
}

/// Create a new underline anchored to a paragraph
async fn create_underline(
    State(state): State<AppState>,
    Json(data): Json<CreateUnderlineRequest>,
) -> Result<(StatusCode, Json<UnderlineBody>)> {
    let repo = UnderlineRepository::new(&state.pool);
    let underline = repo
        .create(
            &data.post_id,
            &CreateUnderline {
                position: data.paragraph_id,
                text: data.text,
                color: data.color,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UnderlineBody::from(underline))))
}

/// Delete an underline
async fn delete_underline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let repo = UnderlineRepository::new(&state.pool);
    let deleted = repo.delete(&id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Underline not found: {}", id)))
    }
}
