//! Resolver strategies: one mechanism each for turning a hostname into an
//! address.
//!
//! A strategy is built once from a [`StrategySpec`] and never mutated
//! afterwards. The [`FallbackResolver`](super::FallbackResolver) owns an
//! ordered list of them.

use super::{DohStrategy, Name, RecursiveStrategy};
use crate::base::neterror::NetError;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    future::Future,
    net::{IpAddr, Ipv4Addr},
    pin::Pin,
    time::Duration,
};
use thiserror::Error;
use url::Url;

/// Why a single strategy could not produce an address.
#[derive(Debug, Error, Clone)]
pub enum ResolutionError {
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport failure: {0}")]
    Transport(#[from] NetError),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no address record")]
    NoAddressRecord,
}

/// Alias for the future returned by [`ResolverStrategy::lookup`].
pub type Lookup<'a> = Pin<Box<dyn Future<Output = Result<IpAddr, ResolutionError>> + Send + 'a>>;

/// A single resolution mechanism.
pub trait ResolverStrategy: Send + Sync + fmt::Debug {
    /// Identity used in logs and failure reports, e.g. `recursive(8.8.8.8)`.
    fn label(&self) -> String;

    /// Resolve `name` to one address.
    fn lookup<'a>(&'a self, name: &'a Name) -> Lookup<'a>;
}

/// Serializable description of a strategy, as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySpec {
    /// Plain DNS against one nameserver.
    Recursive { nameserver: IpAddr },
    /// DNS-over-HTTPS against one endpoint.
    Doh { endpoint: Url },
}

impl StrategySpec {
    /// Google, Google secondary, Cloudflare.
    pub fn default_chain() -> Vec<StrategySpec> {
        [
            Ipv4Addr::new(8, 8, 8, 8),
            Ipv4Addr::new(8, 8, 4, 4),
            Ipv4Addr::new(1, 1, 1, 1),
        ]
        .into_iter()
        .map(|ip| StrategySpec::Recursive {
            nameserver: IpAddr::V4(ip),
        })
        .collect()
    }

    /// Instantiate the strategy.
    pub fn build(&self, timeout: Duration) -> Box<dyn ResolverStrategy> {
        match self {
            StrategySpec::Recursive { nameserver } => {
                Box::new(RecursiveStrategy::new(*nameserver, timeout))
            }
            StrategySpec::Doh { endpoint } => Box::new(DohStrategy::new(endpoint.clone(), timeout)),
        }
    }
}

impl fmt::Display for StrategySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategySpec::Recursive { nameserver } => write!(f, "recursive({nameserver})"),
            StrategySpec::Doh { endpoint } => write!(f, "doh({endpoint})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_order() {
        let chain = StrategySpec::default_chain();
        let labels: Vec<String> = chain.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "recursive(8.8.8.8)",
                "recursive(8.8.4.4)",
                "recursive(1.1.1.1)"
            ]
        );
    }

    #[test]
    fn test_spec_json_shape() {
        let specs: Vec<StrategySpec> = serde_json::from_str(
            r#"[
                {"kind": "recursive", "nameserver": "9.9.9.9"},
                {"kind": "doh", "endpoint": "https://dns.google/dns-query"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            specs[0],
            StrategySpec::Recursive {
                nameserver: "9.9.9.9".parse().unwrap()
            }
        );
        match &specs[1] {
            StrategySpec::Doh { endpoint } => assert_eq!(endpoint.host_str(), Some("dns.google")),
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn test_built_strategy_keeps_identity() {
        let spec = StrategySpec::Recursive {
            nameserver: "1.1.1.1".parse().unwrap(),
        };
        let strategy = spec.build(Duration::from_secs(1));
        assert_eq!(strategy.label(), "recursive(1.1.1.1)");
    }
}
