use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset selects the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub external_jobs: ExternalJobsConfig,
}

/// Settings for the third-party job-search adapter.
#[derive(Debug, Clone)]
pub struct ExternalJobsConfig {
    pub app_id: Option<String>,
    pub app_key: Option<String>,
    pub country: String,
    pub base_url: String,
    pub results_per_page: u32,
    pub timeout_secs: u64,
}

impl Default for ExternalJobsConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_key: None,
            country: "in".to_string(),
            base_url: "https://api.adzuna.com/v1/api".to_string(),
            results_per_page: 10,
            timeout_secs: 15,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ExternalJobsConfig::default();
        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            external_jobs: ExternalJobsConfig {
                app_id: optional_env("ADZUNA_APP_ID"),
                app_key: optional_env("ADZUNA_APP_KEY"),
                country: optional_env("ADZUNA_COUNTRY").unwrap_or(defaults.country),
                base_url: optional_env("ADZUNA_BASE_URL").unwrap_or(defaults.base_url),
                results_per_page: parse_env("EXTERNAL_JOBS_PER_PAGE", defaults.results_per_page)?,
                timeout_secs: parse_env("EXTERNAL_JOBS_TIMEOUT_SECS", defaults.timeout_secs)?,
            },
        })
    }
}

/// Empty values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
