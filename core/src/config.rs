//! Client configuration supplied by the host app.
//!
//! The core reads no environment variables and no files; a host either uses
//! the defaults or passes a JSON document through `DrinkConfig::from_json`.

use std::time::Duration;

use serde::Deserialize;

use crate::endpoint::DEFAULT_BASE_URL;

const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DrinkConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Quiescence window for search-text changes, in milliseconds.
    pub search_debounce_ms: u64,
}

impl Default for DrinkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
        }
    }
}

impl DrinkConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DrinkConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DrinkConfig::from_json(r#"{"base_url":"http://127.0.0.1:3000"}"#).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.search_debounce_ms, 500);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(DrinkConfig::from_json(r#"{"search_debounce_ms":"soon"}"#).is_err());
    }
}
