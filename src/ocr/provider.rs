//! Extractor backends
//!
//! Defines the extractor trait and the two REST-backed implementations.

use async_trait::async_trait;
use base64::Engine;

use super::types::{ExtractionError, OcrBackend};

/// Transcription prompt for the generative-vision backend. Asks for markdown
/// headings so downstream segmentation can pass heading markers through.
const GEMINI_PROMPT: &str = "Extract and transcribe all the text from this book page image. \
    Maintain the paragraph structure. If there are headings, format them as markdown headings. \
    Only return the extracted text, no additional commentary.";

/// Text extractor trait
///
/// `extract` must fully complete (or fail) before segmentation begins; there
/// is no streaming of partial OCR output.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Which backend this is
    fn backend(&self) -> OcrBackend;

    /// Whether the backend is usable (configured with credentials)
    async fn is_available(&self) -> bool;

    /// Extract raw text from image bytes
    async fn extract(&self, image: &[u8], mime_type: &str) -> Result<String, ExtractionError>;
}

/// Google Gemini generative-vision extractor
pub struct GeminiExtractor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiExtractor {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_base_url(api_key, model, "https://generativelanguage.googleapis.com")
    }

    /// Override the API host, for tests against a local stub.
    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl TextExtractor for GeminiExtractor {
    fn backend(&self) -> OcrBackend {
        OcrBackend::Gemini
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn extract(&self, image: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
        if self.api_key.is_empty() {
            return Err(ExtractionError::BackendUnavailable(
                "Gemini API key not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image);

        let request = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": GEMINI_PROMPT },
                    { "inline_data": { "mime_type": mime_type, "data": image_base64 } }
                ]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::ApiError(format!("Failed to call Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ApiError(format!(
                "Gemini returned {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        parse_gemini_response(&body)
    }
}

/// Pull the transcription out of a `generateContent` response body.
fn parse_gemini_response(body: &serde_json::Value) -> Result<String, ExtractionError> {
    let text = body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| {
            ExtractionError::MalformedResponse(
                "Gemini response has no candidate text".to_string(),
            )
        })?;

    Ok(text.trim().to_string())
}

/// Google Cloud Vision document-text-detection extractor
pub struct CloudVisionExtractor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CloudVisionExtractor {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, "https://vision.googleapis.com")
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl TextExtractor for CloudVisionExtractor {
    fn backend(&self) -> OcrBackend {
        OcrBackend::Vision
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn extract(&self, image: &[u8], _mime_type: &str) -> Result<String, ExtractionError> {
        if self.api_key.is_empty() {
            return Err(ExtractionError::BackendUnavailable(
                "Cloud Vision API key not configured".to_string(),
            ));
        }

        let url = format!("{}/v1/images:annotate?key={}", self.base_url, self.api_key);

        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image);

        let request = serde_json::json!({
            "requests": [{
                "image": { "content": image_base64 },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::ApiError(format!("Failed to call Vision API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ApiError(format!(
                "Vision API returned {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        parse_vision_response(&body)
    }
}

/// Pull the full text annotation out of an `images:annotate` response body.
fn parse_vision_response(body: &serde_json::Value) -> Result<String, ExtractionError> {
    let first = &body["responses"][0];

    if let Some(message) = first["error"]["message"].as_str() {
        return Err(ExtractionError::ApiError(format!(
            "Vision API error: {}",
            message
        )));
    }

    // A page with no detectable text yields no annotation at all; that is a
    // valid empty transcript, not a failure.
    let text = first["fullTextAnnotation"]["text"].as_str().unwrap_or("");

    Ok(text.trim().to_string())
}
