use std::{env, time::Duration};

const DEFAULT_MAX_ENTRIES: u64 = 256;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: u64,
    pub time_to_live: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            time_to_live: None,
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let max_entries = env::var("PHOTO_CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_ENTRIES);

        let time_to_live = env::var("PHOTO_CACHE_TTL_SECS")
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .map(Duration::from_secs);

        Self {
            max_entries,
            time_to_live,
        }
    }
}
