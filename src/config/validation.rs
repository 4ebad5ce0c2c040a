use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::{ConfigError, ConfigResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::collections::BTreeMap;

/// Longest pause allowed between followed-link fetches (milliseconds)
const MAX_FOLLOW_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    build_header_map(&config.headers)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.follow_delay_ms > MAX_FOLLOW_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "follow_delay_ms must be <= {}ms, got {}ms",
            MAX_FOLLOW_DELAY_MS, config.follow_delay_ms
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs > config.request_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs ({}) cannot exceed request_timeout_secs ({})",
            config.connect_timeout_secs, config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Converts the configured header table into a request header map
///
/// Every name and value must be a legal HTTP header, and a non-empty
/// `User-Agent` must be present.
pub fn build_header_map(headers: &BTreeMap<String, String>) -> ConfigResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }

    let has_user_agent = map
        .get(USER_AGENT)
        .map(|ua| !ua.as_bytes().is_empty())
        .unwrap_or(false);
    if !has_user_agent {
        return Err(ConfigError::Validation(
            "headers must include a non-empty User-Agent".to_string(),
        ));
    }

    Ok(map)
}
