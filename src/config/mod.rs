use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration, built once and passed by reference into the
/// components that need it. No ambient client state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub store: StoreConfig,
    pub llm: LlmConfig,
    pub telemetry: TelemetryConfig,
}

const DEFAULT_STORE_API_URL: &str = "https://api.airtable.com/v0";
const DEFAULT_LLM_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_LLM_MODEL: &str = "gemini-1.5-flash";

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let store = StoreConfig {
            api_url: env::var("AIRTABLE_API_URL")
                .unwrap_or_else(|_| DEFAULT_STORE_API_URL.to_string()),
            api_key: require("AIRTABLE_API_KEY")?,
            base_id: require("AIRTABLE_BASE_ID")?,
        };

        let llm = LlmConfig {
            api_url: env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_LLM_API_URL.to_string()),
            api_key: require("GOOGLE_API_KEY")?,
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            max_output_tokens: 500,
            temperature: 0.5,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            store,
            llm,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar { name }),
    }
}

/// Connection settings for the Airtable record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub api_url: String,
    pub api_key: String,
    pub base_id: String,
}

/// Connection and sampling settings for the generation service.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar { name } => {
                write!(f, "{name} must be set in the environment or .env file")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
