//! Firestore Settings, Source and GetOptions types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Settings for configuring Firestore behavior
///
/// Forwarded to the native binding by `Firestore::settings` after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Host of the Firestore backend to connect to
    ///
    /// Default: "firestore.googleapis.com"
    pub host: String,

    /// Whether to use SSL for communication
    ///
    /// Default: true
    pub ssl: bool,

    /// Whether to enable local persistent storage
    ///
    /// When enabled, Firestore caches documents locally and serves them when offline.
    ///
    /// Default: true
    pub persistence: bool,

    /// Cache size threshold for on-disk data in bytes
    ///
    /// If the cache grows beyond this size, Firestore will start removing data
    /// that hasn't been recently used. Set to [`Settings::CACHE_SIZE_UNLIMITED`]
    /// to disable collection.
    ///
    /// Default: 100 MB (104857600 bytes)
    pub cache_size_bytes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "firestore.googleapis.com".to_string(),
            ssl: true,
            persistence: true,
            cache_size_bytes: 100 * 1024 * 1024, // 100 MB
        }
    }
}

impl Settings {
    /// Constant to use with cache_size_bytes to disable garbage collection
    pub const CACHE_SIZE_UNLIMITED: i64 = -1;

    /// Smallest accepted cache size
    pub const MIN_CACHE_SIZE_BYTES: i64 = 1024 * 1024;

    /// Creates default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the settings before they are forwarded
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("'settings.host' must not be an empty string.".to_string());
        }
        if self.cache_size_bytes != Self::CACHE_SIZE_UNLIMITED
            && self.cache_size_bytes < Self::MIN_CACHE_SIZE_BYTES
        {
            return Err(
                "'settings.cacheSizeBytes' the minimum cache size is 1048576 bytes (1MB)."
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Source options for Firestore queries
///
/// Configures where Firestore should fetch data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Default behavior - try server first, fall back to cache if offline
    #[default]
    Default,

    /// Only fetch from server, fail if offline
    Server,

    /// Only fetch from local cache, fail if not cached
    Cache,
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Source::Default),
            "server" => Ok(Source::Server),
            "cache" => Ok(Source::Cache),
            _ => Err(
                "'options' GetOptions.source must be one of 'default', 'server' or 'cache'."
                    .to_string(),
            ),
        }
    }
}

/// Options for a one-shot `get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOptions {
    /// Where to read from
    #[serde(default)]
    pub source: Source,
}

impl From<Source> for GetOptions {
    fn from(source: Source) -> Self {
        Self { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
        let unlimited = Settings {
            cache_size_bytes: Settings::CACHE_SIZE_UNLIMITED,
            ..Settings::default()
        };
        assert!(unlimited.validate().is_ok());
    }

    #[test]
    fn test_small_cache_rejected() {
        let settings = Settings {
            cache_size_bytes: 1024,
            ..Settings::default()
        };
        assert!(settings.validate().unwrap_err().contains("minimum cache size"));
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("server".parse::<Source>(), Ok(Source::Server));
        assert_eq!("cache".parse::<Source>(), Ok(Source::Cache));
        let err = "disk".parse::<Source>().unwrap_err();
        assert!(err.contains("'default', 'server' or 'cache'"));
    }

    #[test]
    fn test_get_options_wire_format() {
        let json = serde_json::to_value(GetOptions::from(Source::Cache)).unwrap();
        assert_eq!(json, serde_json::json!({"source": "cache"}));
    }
}
