use serde::Deserialize;
use std::collections::BTreeMap;

/// Default pause between followed-link fetches
pub const DEFAULT_FOLLOW_DELAY_MS: u64 = 2000;

/// Main configuration structure for Robly
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Request headers sent with every fetch
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            headers: default_headers(),
            output: OutputConfig::default(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Pause between successive followed-link fetches (milliseconds)
    #[serde(rename = "follow-delay-ms", default = "default_follow_delay_ms")]
    pub follow_delay_ms: u64,

    /// Total time allowed for a single request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            follow_delay_ms: default_follow_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_follow_delay_ms() -> u64 {
    DEFAULT_FOLLOW_DELAY_MS
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_database_path() -> String {
    "robly.db".to_string()
}

/// The desktop-browser identity the crawler presents
///
/// Some sites vary their markup on these headers, so they are part of what
/// the crawler indexes, not decoration.
pub fn default_headers() -> BTreeMap<String, String> {
    [
        ("Accept", "text/css,*/*;q=0.1"),
        ("Accept-Charset", "ISO-8859-1,utf-8;q=0.7,*;q=0.3"),
        ("Accept-Encoding", "gzip, br"),
        ("Accept-Language", "en-US,en;q=0.8"),
        ("User-Agent", "Mozilla/5 (Windows 7) Gecko"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}
