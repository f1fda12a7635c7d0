//! BookPost Server Library
//!
//! A self-hosted reading/annotation server: upload a photographed book page,
//! run OCR against a pluggable vision backend, segment the transcript into
//! stably-ordered paragraphs, and anchor ideas and underlines to them.
//!
//! # Modules
//!
//! - `segment`: paragraph segmentation and title derivation (the core)
//! - `ocr`: text extractor boundary (Gemini / Cloud Vision backends)
//! - `pipeline`: extract -> segment -> title orchestration
//! - `db`: SQLite persistence for posts, paragraphs, ideas, underlines
//! - `routes`: HTTP API

pub mod config;
pub mod db;
pub mod error;
pub mod ocr;
pub mod pipeline;
pub mod routes;
pub mod segment;
pub mod state;
