use serde::{Deserialize, Serialize};

use crate::{DEFAULT_BACKEND_URL, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub backend_url: String,
    pub timeout_secs: u64,

    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl AgentConfig {
    pub fn new(backend_url: &str) -> Self {
        Self {
            backend_url: backend_url.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,

            cache_enabled: true,
            cache_ttl_secs: DEFAULT_CACHE_TTL,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::new(
            &std::env::var("PRILAVOK_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
        );

        if let Ok(timeout) = std::env::var("PRILAVOK_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.timeout_secs = secs;
            }
        }
        if let Ok(enabled) = std::env::var("CACHE_ENABLED") {
            config.cache_enabled = enabled != "0" && !enabled.eq_ignore_ascii_case("false");
        }
        if let Ok(ttl) = std::env::var("CACHE_TTL_SECONDS") {
            if let Ok(secs) = ttl.parse() {
                config.cache_ttl_secs = secs;
            }
        }
        if let Ok(capacity) = std::env::var("CACHE_CAPACITY") {
            if let Ok(size) = capacity.parse() {
                config.cache_capacity = size;
            }
        }

        config
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}
