//! Paragraph segmentation
//!
//! Turns a raw OCR transcript (one long, possibly noisy string) into an
//! ordered sequence of clean paragraph texts. Every annotation in the system
//! is anchored to a paragraph by its 1-based position, so this conversion has
//! to be deterministic and order-preserving: the persistence layer assigns
//! positions 1..N in exactly the order produced here.
//!
//! The segmenter is total and pure. It never fails, performs no I/O, and the
//! same input always yields the same output, so concurrent invocations need no
//! coordination.

use regex::Regex;

/// Default minimum length (in chars) a normalized block must exceed to
/// survive the noise filter. Shorter blocks are page numbers, running
/// headers, and scanning artifacts.
pub const DEFAULT_MIN_PARAGRAPH_LEN: usize = 20;

/// Default maximum length of a derived title before truncation.
pub const DEFAULT_TITLE_MAX_LEN: usize = 50;

/// Title used when no title was supplied and segmentation produced nothing.
pub const FALLBACK_TITLE: &str = "Untitled Post";

/// Tunable segmentation policy.
///
/// The thresholds are policy, not algorithmic necessities; they default to
/// the values observed to work on real book scans but can be overridden from
/// configuration.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Normalized blocks with char length <= this are discarded as noise.
    pub min_paragraph_len: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_paragraph_len: DEFAULT_MIN_PARAGRAPH_LEN,
        }
    }
}

/// Splits raw OCR text into ordered, normalized, filtered paragraphs.
#[derive(Debug, Clone)]
pub struct Segmenter {
    boundary: Regex,
    config: SegmenterConfig,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        // A boundary is any whitespace run containing at least two newlines:
        // one or more newlines, optional horizontal whitespace, one or more
        // further newlines. A single newline inside a block does not split.
        let boundary = Regex::new(r"\n\s*\n+").expect("paragraph boundary pattern is valid");
        Self { boundary, config }
    }

    /// Segment raw text into paragraphs.
    ///
    /// Blocks are split at blank-line boundaries, whitespace-normalized
    /// (interior runs collapsed to single spaces, ends trimmed), and dropped
    /// when too short. Relative order of survivors is the order of first
    /// appearance in the input. An empty result is a valid outcome, not an
    /// error.
    pub fn segment(&self, raw: &str) -> Vec<String> {
        self.boundary
            .split(raw)
            .map(normalize_block)
            .filter(|block| block.chars().count() > self.config.min_paragraph_len)
            .collect()
    }
}

/// Collapse every whitespace run (spaces, tabs, newlines) to a single space
/// and trim the ends. Idempotent: normalizing normalized text is a no-op.
fn normalize_block(block: &str) -> String {
    block.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive a post title from the segmented paragraphs.
///
/// A supplied non-blank title wins (the literal fallback counts as absent,
/// matching the upload API where clients may echo the placeholder back).
/// Otherwise the first paragraph is truncated to `max_len` chars with an
/// ellipsis marker appended only when truncation actually occurred. With no
/// paragraphs at all, the fallback literal is returned.
///
/// Must run after segmentation completes; it is a pure function of the
/// segmenter's output.
pub fn derive_title(paragraphs: &[String], supplied: Option<&str>, max_len: usize) -> String {
    if let Some(title) = supplied {
        let trimmed = title.trim();
        if !trimmed.is_empty() && trimmed != FALLBACK_TITLE {
            return trimmed.to_string();
        }
    }

    match paragraphs.first() {
        Some(first) => {
            if first.chars().count() > max_len {
                let truncated: String = first.chars().take(max_len).collect();
                format!("{}...", truncated)
            } else {
                first.clone()
            }
        }
        None => FALLBACK_TITLE.to_string(),
    }
}
