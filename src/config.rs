use crate::extraction::ProcessingOptions;
use crate::llm::{LlmSettings, Provider};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `DOCSIFT_SERVER__PORT=8000`.
pub const ENV_PREFIX: &str = "DOCSIFT";

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Route scanned content through OCR-style reconstruction by default
    #[arg(long)]
    pub enable_ocr: Option<bool>,

    /// Enable rate limiting
    #[arg(long, env = "RATE_LIMIT_ENABLED")]
    pub rate_limit_enabled: Option<bool>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED")]
    pub timeout_disabled: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub resilience: ResilienceConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub rate_limit_enabled: bool,
    pub timeout_disabled: bool,
    pub requests_per_second: f32,
    pub burst_size: f32,
    pub request_timeout_secs: u64,
}

/// Defaults applied to requests that carry no options of their own.
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    pub enable_ocr: bool,
    pub max_pages: u32,
    pub quality_threshold: f32,
    pub enable_image_analysis: bool,
    /// Upper bound on a single completion call.
    pub llm_timeout_secs: u64,
}

impl ExtractionConfig {
    pub fn default_options(&self) -> ProcessingOptions {
        ProcessingOptions {
            enable_ocr: self.enable_ocr,
            max_pages: self.max_pages,
            quality_threshold: self.quality_threshold,
            enable_image_analysis: self.enable_image_analysis,
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Priority: CLI flag > `DOCSIFT_*` env var > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let defaults = ProcessingOptions::default();
        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("resilience.rate_limit_enabled", true)?
            .set_default("resilience.timeout_disabled", false)?
            .set_default("resilience.requests_per_second", 5.0)?
            .set_default("resilience.burst_size", 10.0)?
            .set_default("resilience.request_timeout_secs", 60)?
            .set_default("extraction.enable_ocr", defaults.enable_ocr)?
            .set_default("extraction.max_pages", defaults.max_pages)?
            .set_default("extraction.quality_threshold", f64::from(defaults.quality_threshold))?
            .set_default("extraction.enable_image_analysis", defaults.enable_image_analysis)?
            .set_default("extraction.llm_timeout_secs", 30)?;

        // An explicit file must exist; the cwd fallback is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            }
            None => builder,
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(ocr) = cli.enable_ocr {
            builder = builder.set_override("extraction.enable_ocr", ocr)?;
        }
        if let Some(rl) = cli.rate_limit_enabled {
            builder = builder.set_override("resilience.rate_limit_enabled", rl)?;
        }
        if let Some(td) = cli.timeout_disabled {
            builder = builder.set_override("resilience.timeout_disabled", td)?;
        }

        builder.build()?.try_deserialize()
    }
}

/// Completion-service settings from `LLM_*` environment variables.
pub fn load_llm_settings() -> Result<LlmSettings, String> {
    let base_url = std::env::var("LLM_BASE_URL")
        .map_err(|_missing| "Missing required env var: LLM_BASE_URL".to_string())?;
    if base_url.trim().is_empty() {
        return Err("LLM_BASE_URL cannot be empty".to_string());
    }

    let model = std::env::var("LLM_MODEL")
        .map_err(|_missing| "Missing required env var: LLM_MODEL".to_string())?;
    if model.trim().is_empty() {
        return Err("LLM_MODEL cannot be empty".to_string());
    }

    let api_key = std::env::var("LLM_API_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty());

    let provider = Provider::detect_from_url(&base_url).with_azure_deployment(
        std::env::var("AZURE_DEPLOYMENT_NAME").ok(),
        std::env::var("AZURE_API_VERSION").ok(),
    );

    Ok(LlmSettings {
        base_url,
        api_key,
        model,
        provider,
    })
}
