use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_MESSAGE_CHARS: usize = 500;
const DEFAULT_RATE_LIMIT_PER_SECOND: u32 = 3;
const DEFAULT_PORT: u16 = 3000;

/// Relay settings, read once at startup.
///
/// | Variable                | Default                                     |
/// |-------------------------|---------------------------------------------|
/// | `GEMINI_API_KEY`        | required                                    |
/// | `GEMINI_MODEL`          | `gemini-1.5-flash`                          |
/// | `GEMINI_API_BASE_URL`   | `https://generativelanguage.googleapis.com` |
/// | `GEMINI_TEMPERATURE`    | `0.7`                                       |
/// | `UPSTREAM_TIMEOUT_SECS` | `30`                                        |
/// | `MAX_MESSAGE_CHARS`     | `500`                                       |
/// | `RATE_LIMIT_PER_SECOND` | `3` (`0` disables pacing)                   |
/// | `PORT`                  | `3000`                                      |
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub temperature: f32,
    pub upstream_timeout: Duration,
    pub max_message_chars: usize,
    pub rate_limit_per_second: u32,
    pub port: u16,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to
    /// touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .context("GEMINI_API_KEY must be set (copy .env.example to .env)")?;

        Ok(Self {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base_url: lookup("GEMINI_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            temperature: parse_or(&lookup, "GEMINI_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            upstream_timeout: Duration::from_secs(parse_or(
                &lookup,
                "UPSTREAM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            max_message_chars: parse_or(&lookup, "MAX_MESSAGE_CHARS", DEFAULT_MAX_MESSAGE_CHARS)?,
            rate_limit_per_second: parse_or(
                &lookup,
                "RATE_LIMIT_PER_SECOND",
                DEFAULT_RATE_LIMIT_PER_SECOND,
            )?,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
