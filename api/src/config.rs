use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: &str = "*";
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_TEMPERATURE: f32 = 0.2;
const DEFAULT_LLM_MAX_TOKENS: u32 = 200;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 15;

/// Settings for the OpenAI-compatible reasoning backend.
#[derive(Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Process-wide configuration, read once at start-up and never mutated.
#[derive(Clone, PartialEq)]
pub struct Config {
    /// Reasoning service credential. `None` disables analysis entirely.
    pub api_key: Option<String>,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub llm: LlmSettings,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let cors_origins = get("ENGAGE_CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            api_key: get("OPENAI_API_KEY"),
            host: get("BACKEND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(get("BACKEND_PORT"), "BACKEND_PORT", DEFAULT_PORT),
            cors_origins,
            llm: LlmSettings {
                base_url: get("ENGAGE_LLM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: get("ENGAGE_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                temperature: parse_or(
                    get("ENGAGE_LLM_TEMPERATURE"),
                    "ENGAGE_LLM_TEMPERATURE",
                    DEFAULT_LLM_TEMPERATURE,
                )
                .clamp(0.0, 2.0),
                max_tokens: parse_or(
                    get("ENGAGE_LLM_MAX_TOKENS"),
                    "ENGAGE_LLM_MAX_TOKENS",
                    DEFAULT_LLM_MAX_TOKENS,
                )
                .max(1),
                timeout: Duration::from_secs(
                    parse_or(
                        get("ENGAGE_LLM_TIMEOUT_SECS"),
                        "ENGAGE_LLM_TIMEOUT_SECS",
                        DEFAULT_LLM_TIMEOUT_SECS,
                    )
                    .max(1),
                ),
            },
        }
    }

    pub fn analyzer_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display + Copy,
{
    match raw {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, default = %default, "invalid setting, using default");
            default
        }),
    }
}

// Hand-written so the credential never ends up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("llm", &self.llm)
            .finish()
    }
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout.as_secs())
            .finish()
    }
}
