use docsift::config::{AppConfig, load_llm_settings};
use docsift::llm::Provider;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;

const OVERRIDE_VARS: &[&str] = &[
    "DOCSIFT_SERVER__PORT",
    "DOCSIFT_EXTRACTION__ENABLE_OCR",
    "DOCSIFT_EXTRACTION__LLM_TIMEOUT_SECS",
    "DOCSIFT_RESILIENCE__RATE_LIMIT_ENABLED",
    "CONFIG_FILE",
    "PORT",
    "RATE_LIMIT_ENABLED",
    "TIMEOUT_DISABLED",
    "LLM_BASE_URL",
    "LLM_MODEL",
    "LLM_API_KEY",
    "AZURE_DEPLOYMENT_NAME",
    "AZURE_API_VERSION",
];

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    for var in OVERRIDE_VARS {
        // SAFETY: every test in this file is #[serial], so no other thread touches the environment.
        unsafe {
            env::remove_var(var);
        }
    }
}

fn set_var(key: &str, value: &str) {
    // SAFETY: see clear_env_vars
    unsafe {
        env::set_var(key, value);
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["docsift"]).expect("defaults should load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert!(config.resilience.rate_limit_enabled);
    assert!(!config.resilience.timeout_disabled);

    let options = config.extraction.default_options();
    assert!(!options.enable_ocr);
    assert_eq!(options.max_pages, 50);
    assert!((options.quality_threshold - 0.3).abs() < f32::EPSILON);
    assert!(!options.enable_image_analysis);
    assert_eq!(config.extraction.llm_timeout().as_secs(), 30);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    set_var("DOCSIFT_SERVER__PORT", "9090");
    set_var("DOCSIFT_EXTRACTION__ENABLE_OCR", "true");
    set_var("DOCSIFT_EXTRACTION__LLM_TIMEOUT_SECS", "12");

    let config = AppConfig::load_from_args(["docsift"]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert!(config.extraction.enable_ocr);
    assert_eq!(config.extraction.llm_timeout().as_secs(), 12);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    set_var("DOCSIFT_SERVER__PORT", "9090");
    set_var("DOCSIFT_RESILIENCE__RATE_LIMIT_ENABLED", "true");

    let config = AppConfig::load_from_args([
        "docsift",
        "--port",
        "8181",
        "--rate-limit-enabled",
        "false",
        "--enable-ocr",
        "true",
    ])
    .expect("Failed to load config");

    assert_eq!(config.server.port, 8181);
    assert!(!config.resilience.rate_limit_enabled);
    assert!(config.extraction.enable_ocr);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temp config");
    writeln!(
        file,
        "server:\n  port: 7070\nextraction:\n  max_pages: 5\n  enable_image_analysis: true"
    )
    .expect("Failed to write temp config");
    let path = file.path().to_string_lossy().to_string();

    let config =
        AppConfig::load_from_args(["docsift", "--config", &path]).expect("Failed to load file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.extraction.max_pages, 5);
    assert!(config.extraction.enable_image_analysis);
    // untouched keys keep their defaults
    assert_eq!(config.resilience.request_timeout_secs, 60);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();
    let result = AppConfig::load_from_args(["docsift", "--config", "/nonexistent/docsift.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cwd_config_fallback() {
    clear_env_vars();

    let cwd_path = "config.yaml";
    fs::write(cwd_path, "server:\n  port: 6060\n").expect("Failed to write ./config.yaml");

    let config = AppConfig::load_from_args(["docsift"]);
    fs::remove_file(cwd_path).expect("Failed to remove ./config.yaml");

    assert_eq!(config.expect("Failed to load config").server.port, 6060);
}

#[test]
#[serial]
fn test_llm_settings_require_url_and_model() {
    clear_env_vars();
    assert!(load_llm_settings().unwrap_err().contains("LLM_BASE_URL"));

    set_var("LLM_BASE_URL", "https://api.groq.com/openai/v1");
    assert!(load_llm_settings().unwrap_err().contains("LLM_MODEL"));

    set_var("LLM_MODEL", "llama-3.1-8b-instant");
    set_var("LLM_API_KEY", "   ");
    let settings = load_llm_settings().expect("settings should load");
    assert_eq!(settings.provider, Provider::Groq);
    assert!(settings.api_key.is_none());

    clear_env_vars();
}

#[test]
#[serial]
fn test_llm_settings_azure_deployment() {
    clear_env_vars();
    set_var("LLM_BASE_URL", "https://contoso.openai.azure.com");
    set_var("LLM_MODEL", "gpt-4o");
    set_var("LLM_API_KEY", "secret");
    set_var("AZURE_DEPLOYMENT_NAME", "extract-prod");

    let settings = load_llm_settings().expect("settings should load");
    match settings.provider {
        Provider::AzureOpenAI {
            deployment_name, ..
        } => assert_eq!(deployment_name, "extract-prod"),
        other => panic!("expected Azure provider, got {other:?}"),
    }
    assert_eq!(settings.api_key.as_deref(), Some("secret"));

    clear_env_vars();
}
