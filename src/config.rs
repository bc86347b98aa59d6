//! Runtime configuration.
//!
//! Read from an optional JSON file; every field falls back to its default so
//! `{}` is a valid config.

use crate::discovery::ItemFailurePolicy;
use crate::dns::StrategySpec;
use crate::itch::ItchEndpoints;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// itch.io API key. Prompted for when empty.
    pub api_key: Option<String>,
    pub checkpoint_path: PathBuf,
    pub catalog_root: Url,
    pub itch: ItchEndpoints,
    /// Resolution chain, tried in order.
    pub resolvers: Vec<StrategySpec>,
    /// Static answers consulted before the chain.
    pub hosts: HashMap<String, Vec<IpAddr>>,
    pub request_timeout_secs: u64,
    /// Per-strategy lookup timeout.
    pub dns_timeout_secs: u64,
    pub item_failure: ItemFailurePolicy,
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            checkpoint_path: PathBuf::from("progress.json"),
            catalog_root: Url::parse("https://loop-io.dev").expect("static URL"),
            itch: ItchEndpoints::default(),
            resolvers: StrategySpec::default_chain(),
            hosts: HashMap::new(),
            request_timeout_secs: 30,
            dns_timeout_secs: 5,
            item_failure: ItemFailurePolicy::default(),
            user_agent: None,
        }
    }
}

impl Config {
    /// Load `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.checkpoint_path, PathBuf::from("progress.json"));
        assert_eq!(config.catalog_root.as_str(), "https://loop-io.dev/");
        assert_eq!(config.resolvers, StrategySpec::default_chain());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.dns_timeout(), Duration::from_secs(5));
        assert_eq!(config.item_failure, ItemFailurePolicy::Halt);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "api_key": "k",
                "item_failure": "skip",
                "resolvers": [
                    {{"kind": "doh", "endpoint": "https://cloudflare-dns.com/dns-query"}},
                    {{"kind": "recursive", "nameserver": "9.9.9.9"}}
                ],
                "hosts": {{"itch.io": ["127.0.0.1"]}},
                "itch": {{"site_root": "http://127.0.0.1:9000"}}
            }}"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.item_failure, ItemFailurePolicy::Skip);
        assert_eq!(config.resolvers.len(), 2);
        assert_eq!(config.hosts["itch.io"], vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);
        assert_eq!(config.itch.site_root.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.itch.api_root.as_str(), "https://itch.io/api/1");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/scout.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"resolvers": [{{"kind": "carrier-pigeon"}}]}}"#).unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_no_path_is_default() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
