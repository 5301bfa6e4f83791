use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Cap applied to the recent-users listing. `None` keeps it unbounded.
    pub recent_users_limit: Option<i64>,
    pub max_page_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                read_env("DATABASE_MAX_CONNECTIONS"),
                10,
            )?,
            port: parse_or("PORT", read_env("PORT"), 8080)?,
            rust_log: read_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            recent_users_limit: parse_optional(
                "RECENT_USERS_LIMIT",
                read_env("RECENT_USERS_LIMIT"),
            )?,
            max_page_size: parse_or("MAX_PAGE_SIZE", read_env("MAX_PAGE_SIZE"), 100)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_optional<T>(key: &str, raw: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map(|v| {
        v.trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{v}'"))
    })
    .transpose()
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_optional(key, raw)?.unwrap_or(default))
}
