use std::{env, str::FromStr, time::Duration};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_MIN_SECS_BACKOFF: u64 = 1;
const DEFAULT_MAX_SECS_BACKOFF: u64 = 10;
const DEFAULT_MAX_RETRY: u32 = 2;

const DEFAULT_USER_AGENT: &str = concat!("photo-loader/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every request a fetcher issues.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_retries: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    pub https_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: DEFAULT_MAX_RETRY,
            min_backoff: Duration::from_secs(DEFAULT_MIN_SECS_BACKOFF),
            max_backoff: Duration::from_secs(DEFAULT_MAX_SECS_BACKOFF),
            https_only: false,
        }
    }
}

impl SessionConfig {
    /// Reads `PHOTO_FETCH_*` overrides, anything unset or unparsable keeps
    /// its default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            timeout: env_parse::<u64>("PHOTO_FETCH_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            user_agent: env::var("PHOTO_FETCH_USER_AGENT").unwrap_or(defaults.user_agent),
            max_retries: env_parse("PHOTO_FETCH_MAX_RETRIES").unwrap_or(defaults.max_retries),
            https_only: env_parse("PHOTO_FETCH_HTTPS_ONLY").unwrap_or(defaults.https_only),
            ..defaults
        }
    }

    pub fn without_retries(mut self) -> Self {
        self.max_retries = 0;

        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
        assert!(!config.https_only);
        assert!(config.user_agent.starts_with("photo-loader/"));
        assert!(config.min_backoff <= config.max_backoff);
    }

    #[test]
    fn test_without_retries() {
        assert_eq!(SessionConfig::default().without_retries().max_retries, 0);
    }
}
