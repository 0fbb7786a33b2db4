//! Persistent application settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::util::Result;

/// Settings that persist between sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Blob-storage aggregator the resolver fetches from
    pub aggregator_base_url: String,

    /// Per-request timeout for blob fetches, in seconds
    pub request_timeout_secs: u64,

    // Product metadata handed to the runtime-creation entry point
    pub company_name: String,
    pub product_version: String,
    pub streaming_assets_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aggregator_base_url: "https://aggregator.walrus-testnet.walrus.space".to_string(),
            request_timeout_secs: 30,
            company_name: "DefaultCompany".to_string(),
            product_version: "1.0".to_string(),
            streaming_assets_url: "StreamingAssets".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults on any
    /// missing file or unreadable content.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save settings as pretty-printed JSON.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.aggregator_base_url.starts_with("https://"));
        assert_eq!(s.company_name, "DefaultCompany");
        assert_eq!(s.product_version, "1.0");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.aggregator_base_url = "https://aggregator.example".to_string();
        settings.request_timeout_secs = 5;
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_load_tolerates_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"request_timeout_secs": 3}"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.request_timeout_secs, 3);
        assert_eq!(settings.company_name, "DefaultCompany");
    }
}
