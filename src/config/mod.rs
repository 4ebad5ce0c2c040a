//! Configuration module for Robly
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; a missing file section falls back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use robly::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("robly.toml")).unwrap();
//! println!("Follow delay: {}ms", config.crawler.follow_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{default_headers, Config, CrawlerConfig, OutputConfig, DEFAULT_FOLLOW_DELAY_MS};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::build_header_map;
