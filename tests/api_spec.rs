//! End-to-end API tests: upload a page against a stub extractor, then
//! exercise the paragraph/idea/underline contracts over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::util::ServiceExt;

use bookpost_server::db;
use bookpost_server::ocr::{ExtractionError, OcrBackend, TextExtractor};
use bookpost_server::pipeline::UploadPipeline;
use bookpost_server::routes;
use bookpost_server::segment::{Segmenter, SegmenterConfig, DEFAULT_TITLE_MAX_LEN};
use bookpost_server::state::AppState;

const TRANSCRIPT: &str = "The morning light fell across the table.\n\n42\n\nShe had been reading the same page for an hour without turning it.";

struct StubExtractor {
    text: String,
}

#[async_trait]
impl TextExtractor for StubExtractor {
    fn backend(&self) -> OcrBackend {
        OcrBackend::Gemini
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn extract(&self, _image: &[u8], _mime: &str) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}

async fn test_app(transcript: &str) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}/test.db", dir.path().display());
    let pool = db::create_pool(&url).await.unwrap();

    let pipeline = Arc::new(UploadPipeline::new(
        Arc::new(StubExtractor {
            text: transcript.to_string(),
        }),
        Segmenter::new(SegmenterConfig::default()),
        DEFAULT_TITLE_MAX_LEN,
        5,
    ));

    (routes::app(AppState::new(pool, pipeline)), dir)
}

fn multipart_upload(title: Option<&str>, author: Option<&str>) -> Request<Body> {
    let boundary = "bookpost-test-boundary";
    let mut body = String::new();

    body.push_str(&format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"page.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nnot-a-real-jpeg\r\n",
        b = boundary
    ));
    if let Some(title) = title {
        body.push_str(&format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{t}\r\n",
            b = boundary,
            t = title
        ));
    }
    if let Some(author) = author {
        body.push_str(&format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"author\"\r\n\r\n{a}\r\n",
            b = boundary,
            a = author
        ));
    }
    body.push_str(&format!("--{}--\r\n", boundary));

    Request::builder()
        .method("POST")
        .uri("/api/posts/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let (app, _dir) = test_app(TRANSCRIPT).await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn upload_segments_page_and_assigns_dense_positions() {
    let (app, _dir) = test_app(TRANSCRIPT).await;

    let response = app.clone().oneshot(multipart_upload(None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;

    // The "42" block is noise and filtered; survivors keep their order and
    // get positions 1..N as external ids.
    let content = body["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["id"], 1);
    assert_eq!(
        content[0]["text"],
        "The morning light fell across the table."
    );
    assert_eq!(content[1]["id"], 2);

    // No title supplied: derived from the first paragraph (40 chars, so no
    // ellipsis), author falls back, filename echoed.
    assert_eq!(body["title"], "The morning light fell across the table.");
    assert_eq!(body["author"], "Anonymous");
    assert_eq!(body["imageUrl"], "page.jpg");
    assert!(body["ideas"].as_array().unwrap().is_empty());
    assert!(body["underlines"].as_array().unwrap().is_empty());

    // And the post shows up in the list
    let response = app.oneshot(get_request("/api/posts")).await.unwrap();
    let list = json_body(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn upload_with_supplied_title_and_author() {
    let (app, _dir) = test_app(TRANSCRIPT).await;

    let response = app
        .oneshot(multipart_upload(Some("Marginalia"), Some("Iris")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["title"], "Marginalia");
    assert_eq!(body["author"], "Iris");
}

#[tokio::test]
async fn upload_of_blank_page_creates_post_with_no_paragraphs() {
    let (app, _dir) = test_app("").await;

    let response = app.oneshot(multipart_upload(None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert!(body["content"].as_array().unwrap().is_empty());
    assert_eq!(body["title"], "Untitled Post");
}

#[tokio::test]
async fn upload_rejects_unsupported_content_type() {
    let (app, _dir) = test_app(TRANSCRIPT).await;

    let boundary = "bookpost-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"page.gif\"\r\nContent-Type: image/gif\r\n\r\nstub\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/posts/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_requires_image_field() {
    let (app, _dir) = test_app(TRANSCRIPT).await;

    let boundary = "bookpost-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nNo image\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/posts/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ideas_anchor_to_valid_positions_only() {
    let (app, _dir) = test_app(TRANSCRIPT).await;

    let response = app.clone().oneshot(multipart_upload(None, None)).await.unwrap();
    let post = json_body(response).await;
    let post_id = post["id"].as_str().unwrap().to_string();

    // Valid position
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/ideas",
            serde_json::json!({
                "postId": post_id,
                "paragraphId": 2,
                "quote": "reading the same page",
                "note": "time dilation again"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let idea = json_body(response).await;
    assert_eq!(idea["paragraphId"], 2);
    let idea_id = idea["id"].as_str().unwrap().to_string();

    // Position 3 does not exist (positions are dense 1..2)
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/ideas",
            serde_json::json!({
                "postId": post_id,
                "paragraphId": 3,
                "quote": "q",
                "note": "n"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Update then delete
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/ideas/{}", idea_id),
            serde_json::json!({ "note": "revised" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["note"], "revised");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/ideas/{}", idea_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get_request(&format!("/api/ideas?post={}", post_id)))
        .await
        .unwrap();
    let ideas = json_body(response).await;
    assert!(ideas.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn underlines_follow_the_same_position_contract() {
    let (app, _dir) = test_app(TRANSCRIPT).await;

    let response = app.clone().oneshot(multipart_upload(None, None)).await.unwrap();
    let post = json_body(response).await;
    let post_id = post["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/underlines",
            serde_json::json!({
                "postId": post_id,
                "paragraphId": 1,
                "text": "morning light"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let underline = json_body(response).await;
    assert_eq!(underline["color"], "yellow");

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/underlines",
            serde_json::json!({
                "postId": post_id,
                "paragraphId": 0,
                "text": "nope"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_post_cascades_to_annotations() {
    let (app, _dir) = test_app(TRANSCRIPT).await;

    let response = app.clone().oneshot(multipart_upload(None, None)).await.unwrap();
    let post = json_body(response).await;
    let post_id = post["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/ideas",
            serde_json::json!({
                "postId": post_id,
                "paragraphId": 1,
                "quote": "q",
                "note": "n"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/posts/{}", post_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/posts/{}", post_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get_request(&format!("/api/ideas?post={}", post_id)))
        .await
        .unwrap();
    let ideas = json_body(response).await;
    assert!(ideas.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn updating_a_post_never_touches_paragraphs() {
    let (app, _dir) = test_app(TRANSCRIPT).await;

    let response = app.clone().oneshot(multipart_upload(None, None)).await.unwrap();
    let post = json_body(response).await;
    let post_id = post["id"].as_str().unwrap().to_string();
    let original_content = post["content"].clone();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/posts/{}", post_id),
            serde_json::json!({ "title": "Renamed", "author": "Someone Else" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = json_body(response).await;
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["author"], "Someone Else");
    assert_eq!(updated["content"], original_content);
}
