//! Configuration management for the BookPost server

use std::env;

use crate::segment::{DEFAULT_MIN_PARAGRAPH_LEN, DEFAULT_TITLE_MAX_LEN};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ocr: OcrConfig,
    pub segmenter: SegmenterSettings,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// OCR backend selection and transport settings.
///
/// A configured Gemini key selects the generative-vision backend; otherwise
/// the Cloud Vision backend is used. Selection happens once at startup, not
/// per call.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub vision_api_key: Option<String>,
    /// Timeout for the extractor HTTP call only; segmentation is untimed.
    pub timeout_secs: u64,
}

/// Segmentation policy knobs, overridable from the environment.
#[derive(Debug, Clone)]
pub struct SegmenterSettings {
    pub min_paragraph_len: usize,
    pub title_max_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "sqlite:./bookpost.db".to_string(),
            },
            ocr: OcrConfig {
                gemini_api_key: None,
                gemini_model: "gemini-2.0-flash-exp".to_string(),
                vision_api_key: None,
                timeout_secs: 60,
            },
            segmenter: SegmenterSettings {
                min_paragraph_len: DEFAULT_MIN_PARAGRAPH_LEN,
                title_max_len: DEFAULT_TITLE_MAX_LEN,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
            ocr: OcrConfig {
                gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
                gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.ocr.gemini_model),
                vision_api_key: env::var("VISION_API_KEY").ok().filter(|k| !k.is_empty()),
                timeout_secs: parse_var("OCR_TIMEOUT_SECS", defaults.ocr.timeout_secs),
            },
            segmenter: SegmenterSettings {
                min_paragraph_len: parse_var(
                    "SEGMENT_MIN_PARAGRAPH_LEN",
                    defaults.segmenter.min_paragraph_len,
                ),
                title_max_len: parse_var("TITLE_MAX_LEN", defaults.segmenter.title_max_len),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
