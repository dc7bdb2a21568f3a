use std::str::FromStr;
use tracing::warn;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DB_PATH: &str = "prompt-bracket.db";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Unset means requests may hang indefinitely.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub llm: LlmSettings,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Config {
            host: text("HOST", DEFAULT_HOST),
            port: parsed(&lookup, "PORT").unwrap_or(DEFAULT_PORT),
            db_path: text("DATABASE_PATH", DEFAULT_DB_PATH),
            llm: LlmSettings {
                api_key: lookup("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()),
                base_url: text("OPENAI_BASE_URL", DEFAULT_BASE_URL),
                model: text("LLM_MODEL", DEFAULT_MODEL),
                temperature: parsed(&lookup, "LLM_TEMPERATURE").unwrap_or(DEFAULT_TEMPERATURE),
                timeout_secs: parsed(&lookup, "LLM_TIMEOUT_SECS"),
            },
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}
