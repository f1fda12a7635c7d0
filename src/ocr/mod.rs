//! Text extractor boundary
//!
//! Everything upstream of segmentation: a pluggable OCR/vision backend that
//! turns image bytes into one raw text string. The backend is chosen once at
//! startup from configuration and injected into the pipeline as an explicit
//! dependency; nothing here is a process-wide singleton.

mod provider;
mod types;

pub use provider::{CloudVisionExtractor, GeminiExtractor, TextExtractor};
pub use types::{ExtractionError, OcrBackend};

use std::sync::Arc;

use crate::config::OcrConfig;

/// Select the extractor backend from configuration.
///
/// A configured Gemini key wins; otherwise Cloud Vision is used, which will
/// report itself unavailable until a key is supplied. The server stays up
/// either way so the browsing API keeps working.
pub fn select_extractor(config: &OcrConfig) -> Arc<dyn TextExtractor> {
    match &config.gemini_api_key {
        Some(key) => {
            tracing::info!(model = %config.gemini_model, "Using Gemini OCR backend");
            Arc::new(GeminiExtractor::new(key, &config.gemini_model))
        }
        None => {
            if config.vision_api_key.is_none() {
                tracing::warn!(
                    "No OCR API key configured; uploads will fail until GEMINI_API_KEY or VISION_API_KEY is set"
                );
            } else {
                tracing::info!("Using Cloud Vision OCR backend");
            }
            Arc::new(CloudVisionExtractor::new(
                config.vision_api_key.as_deref().unwrap_or(""),
            ))
        }
    }
}
