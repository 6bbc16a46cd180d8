//! Server configuration

use std::str::FromStr;
use thiserror::Error;

/// Configuration errors detected at start-up
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Server configuration loaded from environment variables
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_url: String,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    pub upload_dir: String,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Build a libpq-style connection string from the discrete `POSTGRES_*` variables
fn database_url_from_parts() -> Option<String> {
    let parts = [
        ("host", "POSTGRES_HOST"),
        ("port", "POSTGRES_PORT"),
        ("user", "POSTGRES_USER"),
        ("password", "POSTGRES_PASSWORD"),
        ("dbname", "POSTGRES_DB"),
    ];
    let pairs: Vec<String> = parts
        .iter()
        .filter_map(|(name, key)| var(key).map(|v| format!("{name}={v}")))
        .collect();

    (!pairs.is_empty()).then(|| pairs.join(" "))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = var("DATABASE_URL")
            .or_else(database_url_from_parts)
            .unwrap_or_else(|| "host=localhost user=postgres dbname=health".into());

        let cors_origins = var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            database_url,
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".into()),
            jwt_secret: var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            token_ttl_hours: parsed("TOKEN_TTL_HOURS", 2)?,
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash".into()),
            gemini_api_url: var("GEMINI_API_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".into()),
            cors_origins,
            rate_limit_rps: parsed("RATE_LIMIT_RPS", 50)?,
            upload_dir: var("UPLOAD_DIR").unwrap_or_else(|| "uploads".into()),
            public_base_url: var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://127.0.0.1:5000".into())
                .trim_end_matches('/')
                .to_string(),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}
