//! OCR boundary types

use serde::{Deserialize, Serialize};

/// OCR backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// Google Gemini generative vision
    Gemini,
    /// Google Cloud Vision document text detection
    Vision,
}

/// Failure of the upstream extraction call.
///
/// Segmentation itself has no error kind; extraction is the only fallible
/// step of the upload pipeline, and a failure aborts the whole upload with
/// no partial post created.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("OCR backend not available: {0}")]
    BackendUnavailable(String),

    #[error("OCR API error: {0}")]
    ApiError(String),

    #[error("OCR response malformed: {0}")]
    MalformedResponse(String),

    #[error("OCR request timed out after {0}s")]
    Timeout(u64),
}
