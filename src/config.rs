use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/dev";
pub const DEFAULT_ORGANIZATION: &str = "goodland";
pub const DEFAULT_MOVE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PORT: u16 = 8080;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub organization: String,
    pub move_timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            move_timeout: Duration::from_secs(DEFAULT_MOVE_TIMEOUT_SECS),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then the process environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("ignoring unreadable .env: {}", e);
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            api_url: get("SCHEDULER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            organization: get("ORGANIZATION_KEY")
                .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string()),
            move_timeout: Duration::from_secs(parse_or(
                "MOVE_TIMEOUT_SECS",
                get("MOVE_TIMEOUT_SECS"),
                DEFAULT_MOVE_TIMEOUT_SECS,
            )),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT),
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("{}={:?} is not valid, using {}", key, raw, default);
            default
        }),
    }
}
