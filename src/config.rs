use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_NETWORK: &str = "devnet";
pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.solana.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Where the editor's backend lives and how to talk to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Base of the backend API; submission routes live under `/solana`,
    /// generation under `/ai`
    pub api_base_url: String,
    /// Solana cluster name, used for explorer links
    pub network: String,
    pub explorer_url: String,
    pub request_timeout_secs: u64,
    /// Network status polling period
    pub poll_interval_secs: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            network: DEFAULT_NETWORK.to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl EditorConfig {
    /// Load config from a JSON file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config from: {}", path.display()))
    }

    /// Save config to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("Failed to write config to: {}", path.display()))
    }

    /// Defaults overridden by `FLOWFORGE_*` environment variables (a `.env`
    /// file in the working directory is read first, if present)
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("FLOWFORGE_API_URL") {
            self.api_base_url = url;
        }
        if let Some(network) = lookup("FLOWFORGE_NETWORK") {
            self.network = network;
        }
        if let Some(url) = lookup("FLOWFORGE_EXPLORER_URL") {
            self.explorer_url = url;
        }
        if let Some(secs) = lookup("FLOWFORGE_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_secs("FLOWFORGE_REQUEST_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("FLOWFORGE_POLL_INTERVAL_SECS") {
            self.poll_interval_secs = parse_secs("FLOWFORGE_POLL_INTERVAL_SECS", &secs)?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Full URL of a backend route, e.g. `endpoint("solana/create-token")`
    pub fn endpoint(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }

    pub fn explorer_tx_url(&self, signature: &str) -> String {
        format!(
            "{}/tx/{}?cluster={}",
            self.explorer_url.trim_end_matches('/'),
            signature,
            self.network
        )
    }

    pub fn explorer_address_url(&self, address: &str) -> String {
        format!(
            "{}/address/{}?cluster={}",
            self.explorer_url.trim_end_matches('/'),
            address,
            self.network
        )
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{} is not a number: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:3001/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flowforge.json");
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"network": "mainnet-beta", "pollIntervalSecs": 10}}"#).unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.network, "mainnet-beta");
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flowforge.json");
        let config = EditorConfig {
            api_base_url: "https://editor.example/api".to_string(),
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = EditorConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open config file"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FLOWFORGE_API_URL", "https://editor.example/api"),
            ("FLOWFORGE_REQUEST_TIMEOUT_SECS", "30"),
        ]
        .into_iter()
        .collect();

        let mut config = EditorConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_base_url, "https://editor.example/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.network, DEFAULT_NETWORK);

        let mut config = EditorConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "FLOWFORGE_POLL_INTERVAL_SECS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_urls() {
        let config = EditorConfig {
            api_base_url: "http://localhost:3001/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint("/solana/create-dao"),
            "http://localhost:3001/api/solana/create-dao"
        );
        assert_eq!(
            config.explorer_tx_url("sig"),
            "https://explorer.solana.com/tx/sig?cluster=devnet"
        );
        assert_eq!(
            config.explorer_address_url("Addr"),
            "https://explorer.solana.com/address/Addr?cluster=devnet"
        );
    }
}
