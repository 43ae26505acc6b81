//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::detection::rules::DEFAULT_LANGUAGE;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Crawler detection rules.
    pub detector: DetectorConfig,

    /// HTTP server settings for `serve`.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Crawler detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Blacklisted route patterns (regular expressions).
    pub ignored_routes: Vec<String>,

    /// Whitelisted route patterns (regular expressions). Empty = all routes.
    pub matched_routes: Vec<String>,

    /// Reject requests for files whose extension is not listed.
    pub check_file_extensions: bool,

    /// Custom `robots.json`; bundled list when absent.
    pub robots_path: Option<PathBuf>,

    /// Custom `extensions.json`; requires `check_file_extensions`.
    pub extensions_path: Option<PathBuf>,

    /// Key of the language-specific list in `extensions.json`.
    pub language: String,

    /// Reload rule files when they change on disk.
    pub watch_rules: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ignored_routes: Vec::new(),
            matched_routes: Vec::new(),
            check_file_extensions: false,
            robots_path: None,
            extensions_path: None,
            language: DEFAULT_LANGUAGE.to_string(),
            watch_rules: false,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
