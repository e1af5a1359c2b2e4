use crate::error::{Error, Result};
use reqwest::Url;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub timeout: Duration,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            admin_username: None,
            admin_password: None,
        })
    }

    /// Admin credentials, when both halves are configured.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_username, &self.admin_password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }
}

pub fn load() -> Result<Config> {
    from_lookup(|key| env::var(key).ok())
}

/// Builds the config from an arbitrary variable source.
pub fn from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = lookup("LOTTO_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout = match lookup("LOTTO_TIMEOUT_SECS") {
        Some(raw) => parse_timeout(&raw)?,
        None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    };

    Ok(Config {
        base_url: parse_base_url(&base_url)?,
        timeout,
        admin_username: lookup("LOTTO_ADMIN_USERNAME").filter(|v| !v.is_empty()),
        admin_password: lookup("LOTTO_ADMIN_PASSWORD").filter(|v| !v.is_empty()),
    })
}

pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("invalid base url '{}': {}", raw, e)))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "base url must be an http(s) origin: {}",
            raw
        )));
    }

    Ok(url)
}

pub fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(Error::Config(format!(
            "timeout must be a positive number of seconds, got '{}'",
            raw
        ))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}
