//! Upload pipeline
//!
//! Sequences extraction -> segmentation -> title derivation. Extraction must
//! fully complete (or fail) before segmentation begins; an extractor failure
//! aborts the whole upload with no partial result. The timeout wraps only the
//! extractor call; segmentation is instantaneous and side-effect-free.

use std::sync::Arc;
use std::time::Duration;

use crate::ocr::{ExtractionError, TextExtractor};
use crate::segment::{derive_title, Segmenter};

/// Everything the persistence layer needs to create a post from one page.
#[derive(Debug, Clone)]
pub struct ProcessedPage {
    pub title: String,
    pub raw_text: String,
    /// Normalized paragraphs in segmentation order; positions 1..N are
    /// assigned at persistence time in exactly this order.
    pub paragraphs: Vec<String>,
}

pub struct UploadPipeline {
    extractor: Arc<dyn TextExtractor>,
    segmenter: Segmenter,
    title_max_len: usize,
    timeout_secs: u64,
}

impl UploadPipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        segmenter: Segmenter,
        title_max_len: usize,
        timeout_secs: u64,
    ) -> Self {
        Self {
            extractor,
            segmenter,
            title_max_len,
            timeout_secs,
        }
    }

    /// Run OCR on the image and produce title + paragraphs.
    ///
    /// Zero paragraphs is a valid outcome (the post simply has no content and
    /// the title falls back to the default literal), not an error.
    pub async fn process(
        &self,
        image: &[u8],
        mime_type: &str,
        supplied_title: Option<&str>,
    ) -> Result<ProcessedPage, ExtractionError> {
        let raw_text = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.extractor.extract(image, mime_type),
        )
        .await
        .map_err(|_| ExtractionError::Timeout(self.timeout_secs))??;

        let paragraphs = self.segmenter.segment(&raw_text);

        tracing::debug!(
            backend = ?self.extractor.backend(),
            raw_len = raw_text.len(),
            paragraphs = paragraphs.len(),
            "Page processed"
        );

        let title = derive_title(&paragraphs, supplied_title, self.title_max_len);

        Ok(ProcessedPage {
            title,
            raw_text,
            paragraphs,
        })
    }
}
