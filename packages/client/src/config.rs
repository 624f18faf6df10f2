use std::path::PathBuf;
use std::time::Duration;

use elara_algo::DEFAULT_QUESTIONS_PER_QUIZ;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
const DB_FILE_NAME: &str = "elara.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: PathBuf,
    pub llm: LlmSettings,
    pub questions_per_quiz: u32,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
    pub retry_delay: Duration,
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            temperature: 0.7,
        }
    }
}

impl LlmSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env_string("LLM_API_KEY"),
            model: env_string("LLM_MODEL").unwrap_or(defaults.model),
            api_endpoint: normalize_endpoint(
                env_string("LLM_API_ENDPOINT")
                    .or_else(|| env_string("LLM_BASE_URL"))
                    .unwrap_or(defaults.api_endpoint),
            ),
            timeout: env_u64("LLM_TIMEOUT")
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            retry_delay: env_u64("LLM_RETRY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            temperature: env_string("LLM_TEMPERATURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let db_path = env_string("ELARA_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let questions_per_quiz = env_u64("QUIZ_QUESTIONS")
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_QUESTIONS_PER_QUIZ);

        Self {
            log_level,
            db_path,
            llm: LlmSettings::from_env(),
            questions_per_quiz,
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("elara"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DB_FILE_NAME)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}

pub(crate) fn normalize_endpoint(endpoint: String) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") || trimmed.contains("/v1/") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}
