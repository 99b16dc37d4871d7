use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::types::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub queue: QueueConfig,
    pub callback: CallbackConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Clone)]
pub struct LLMConfig {
    pub provider: String,
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub prompt_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueProvider {
    /// Hosted QStash broker, delivering back to `/api/process-job`
    QStash,
    /// In-process channel, for local development
    Local,
}

#[derive(Clone)]
pub struct QueueConfig {
    pub provider: QueueProvider,
    pub qstash_url: String,
    pub qstash_token: String,
    /// Public host of this deployment, used to build the job URL
    pub public_host: String,
    pub current_signing_key: Option<String>,
    pub next_signing_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CallbackConfig {
    pub timeout: Duration,
}

// Secrets stay out of the startup log line
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("prompt_dir", &self.prompt_dir)
            .finish()
    }
}

impl std::fmt::Debug for QueueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueConfig")
            .field("provider", &self.provider)
            .field("qstash_url", &self.qstash_url)
            .field("public_host", &self.public_host)
            .field("signing_keys", &self.current_signing_key.is_some())
            .finish()
    }
}

impl QueueConfig {
    /// Absolute URL the queue delivers jobs to
    pub fn job_url(&self) -> String {
        let host = self
            .public_host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        format!("https://{}/api/process-job", host)
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    ///
    /// Fails when the queue cannot be reached with the given settings, so the
    /// process never starts serving traffic half-configured.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match var("QUEUE_PROVIDER").as_deref() {
            None | Some("qstash") => QueueProvider::QStash,
            Some("local") => QueueProvider::Local,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "QUEUE_PROVIDER must be 'qstash' or 'local', got '{}'",
                    other
                )))
            }
        };

        let qstash_token = var("QSTASH_TOKEN").unwrap_or_default();
        let public_host = var("PUBLIC_HOST")
            .or_else(|| var("VERCEL_URL"))
            .unwrap_or_default();

        if provider == QueueProvider::QStash {
            if qstash_token.is_empty() {
                return Err(AppError::Config(
                    "QSTASH_TOKEN is not defined in environment variables.".into(),
                ));
            }
            if public_host.is_empty() {
                return Err(AppError::Config(
                    "PUBLIC_HOST (or VERCEL_URL) is required to build the job URL".into(),
                ));
            }
        }

        Ok(Self {
            server: ServerConfig {
                port: parse_or(&var, "PORT", 3000)?,
                host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            },
            llm: LLMConfig {
                provider: var("LLM_PROVIDER").unwrap_or_else(|| "google".to_string()),
                api_key: var("GEMINI_API_KEY"),
                model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".to_string()),
                api_base: var("GEMINI_API_BASE")
                    .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
                temperature: parse_or(&var, "LLM_TEMPERATURE", 0.7)?,
                timeout: Duration::from_secs(parse_or(&var, "LLM_TIMEOUT_SECS", 25)?),
                prompt_dir: var("PROMPT_DIR").map(PathBuf::from),
            },
            queue: QueueConfig {
                provider,
                qstash_url: var("QSTASH_URL")
                    .unwrap_or_else(|| "https://qstash.upstash.io".to_string()),
                qstash_token,
                public_host,
                current_signing_key: var("QSTASH_CURRENT_SIGNING_KEY"),
                next_signing_key: var("QSTASH_NEXT_SIGNING_KEY"),
            },
            callback: CallbackConfig {
                timeout: Duration::from_secs(parse_or(&var, "CALLBACK_TIMEOUT_SECS", 10)?),
            },
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: '{}'", key, raw))),
        None => Ok(default),
    }
}
