//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    /// Base URL of the membership REST backend.
    pub backend_url: String,
    pub templates_dir: String,
    pub secret: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Delay before a typed search term is submitted by the browser.
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,
    /// How long an untouched list keeps its search, filters and page.
    #[serde(default = "default_view_idle")]
    pub view_idle_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_search_debounce() -> u64 {
    400
}

fn default_view_idle() -> u64 {
    8 * 60 * 60
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn view_idle(&self) -> Duration {
        Duration::from_secs(self.view_idle_secs)
    }
}
