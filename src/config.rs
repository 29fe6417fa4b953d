use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    /// `compact` (default) or `json`.
    pub log_format: String,
    pub event_buffer_size: usize,
    pub service: ServiceSettings,
}

/// Knobs shared by the request handlers.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Candidates tried before generation reports exhaustion. At least 1.
    pub max_generate_attempts: u32,
    /// Seeds the tracking-number RNG; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub page_size: usize,
    /// Directory served for any path no route claims.
    pub static_dir: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            max_generate_attempts: 5,
            seed: None,
            page_size: 20,
            static_dir: "static".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let max_generate_attempts: u32 = parse_or_default("TRACKING_MAX_ATTEMPTS", 5)?;
        if max_generate_attempts == 0 {
            return Err(AppError::Internal(
                "invalid TRACKING_MAX_ATTEMPTS: must be at least 1".to_string(),
            ));
        }

        let page_size: usize = parse_or_default("PAGE_SIZE", 20)?;
        if page_size == 0 {
            return Err(AppError::Internal(
                "invalid PAGE_SIZE: must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            service: ServiceSettings {
                max_generate_attempts,
                seed: parse_optional("TRACKING_SEED")?,
                page_size,
                static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            },
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(key)?.unwrap_or(default))
}

fn parse_optional<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(None),
    }
}
