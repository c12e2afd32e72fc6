//! docsift
//!
//! Content-quality assessment and multi-strategy text extraction for raw
//! document text, served over HTTP.
//!
//! # Architecture
//!
//! - **Extraction**: quality scoring, strategy selection, cleanup and
//!   language-model recovery behind a single never-failing pipeline
//! - **LLM**: OpenAI-compatible Chat Completions client behind a small trait
//! - **Server**: Axum routes with tracing, body-limit, timeout and rate-limit layers
//!
//! # Modules
//!
//! - [`extraction`]: the pipeline and its components
//! - [`llm`]: completion-service trait, provider detection and HTTP client
//! - [`config`]: layered configuration (defaults, file, env, CLI)
//! - [`server`]: router and handlers

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod extraction;
pub mod llm;
pub mod rate_limit;
pub mod server;
pub mod telemetry;

use crate::config::AppConfig;
use crate::extraction::ExtractionOrchestrator;
use crate::rate_limit::SimpleRateLimiter;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Extraction pipeline.
    pub orchestrator: Arc<ExtractionOrchestrator>,
    /// Global Rate Limiter
    pub rate_limiter: Arc<SimpleRateLimiter>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
