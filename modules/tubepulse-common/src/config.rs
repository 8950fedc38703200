use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
///
/// The tunables are deliberate design constants with env overrides, so a
/// deployment can slow the refresh cadence or tighten timeouts without a
/// rebuild.
#[derive(Debug, Clone)]
pub struct Config {
    // YouTube Data API
    pub youtube_api_key: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    /// Periodic re-aggregation cadence per query.
    pub refresh_interval: Duration,
    /// Bound on the sentiment aggregation step of a run.
    pub sentiment_timeout: Duration,
    /// Bound on each per-video detail fetch.
    pub detail_fetch_timeout: Duration,
    /// TTL for cached video descriptions.
    pub detail_cache_ttl: Duration,
    /// Page size requested from the search endpoint on aggregation runs.
    pub search_page_size: u32,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            youtube_api_key: required_env("YOUTUBE_API_KEY"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            refresh_interval: duration_env("REFRESH_INTERVAL_SECS", 60),
            sentiment_timeout: duration_env("SENTIMENT_TIMEOUT_SECS", 5),
            detail_fetch_timeout: duration_env("DETAIL_FETCH_TIMEOUT_SECS", 10),
            detail_cache_ttl: duration_env("DETAIL_CACHE_TTL_SECS", 3600),
            search_page_size: env::var("SEARCH_PAGE_SIZE")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .expect("SEARCH_PAGE_SIZE must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn duration_env(key: &str, default_secs: u64) -> Duration {
    let secs = env::var(key)
        .map(|v| {
            v.parse()
                .unwrap_or_else(|_| panic!("{key} must be a number of seconds"))
        })
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}
