//! Ordered fallback over resolver strategies.

use super::{Addrs, Name, Resolve, ResolutionError, ResolverStrategy, Resolving, StrategySpec};
use crate::base::neterror::NetError;
use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use thiserror::Error;

/// One strategy's failure during a sweep.
#[derive(Debug, Clone)]
pub struct StrategyFailure {
    pub strategy: String,
    pub error: ResolutionError,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

/// Every strategy in the chain failed for `hostname`.
#[derive(Debug, Clone, Error)]
#[error("all {} resolver strategies failed for {hostname}", .failures.len())]
pub struct AllResolutionFailed {
    pub hostname: String,
    pub failures: Vec<StrategyFailure>,
}

/// A successful sweep: the address and the failures seen before it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub addr: IpAddr,
    pub strategy: String,
    pub failures: Vec<StrategyFailure>,
}

/// Tries strategies strictly in order and returns the first answer.
///
/// Strategies are never raced. Nothing is cached.
#[derive(Clone)]
pub struct FallbackResolver {
    strategies: Arc<[Box<dyn ResolverStrategy>]>,
}

impl FallbackResolver {
    pub fn new(strategies: Vec<Box<dyn ResolverStrategy>>) -> Self {
        Self {
            strategies: strategies.into(),
        }
    }

    /// Build the chain described by configuration.
    pub fn from_specs(specs: &[StrategySpec], timeout: Duration) -> Self {
        Self::new(specs.iter().map(|spec| spec.build(timeout)).collect())
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Labels of the chain, in priority order.
    pub fn labels(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.label()).collect()
    }

    /// Run one sweep over the chain.
    pub async fn lookup(&self, name: &Name) -> Result<Resolved, AllResolutionFailed> {
        let mut failures = Vec::new();

        for strategy in self.strategies.iter() {
            match strategy.lookup(name).await {
                Ok(addr) => {
                    tracing::debug!(
                        domain = %name,
                        strategy = %strategy.label(),
                        %addr,
                        "resolved"
                    );
                    return Ok(Resolved {
                        addr,
                        strategy: strategy.label(),
                        failures,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        domain = %name,
                        strategy = %strategy.label(),
                        error = %error,
                        "DNS strategy failed, trying next"
                    );
                    failures.push(StrategyFailure {
                        strategy: strategy.label(),
                        error,
                    });
                }
            }
        }

        tracing::error!(domain = %name, attempts = failures.len(), "all DNS strategies failed");
        Err(AllResolutionFailed {
            hostname: name.to_string(),
            failures,
        })
    }
}

impl Resolve for FallbackResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let resolved = resolver
                .lookup(&name)
                .await
                .map_err(|e| NetError::dns_failed(name.as_str(), e))?;
            Ok(Box::new(std::iter::once(SocketAddr::new(resolved.addr, 0))) as Addrs)
        })
    }
}

impl fmt::Debug for FallbackResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackResolver")
            .field("strategies", &self.labels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::Lookup;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Scripted {
        label: &'static str,
        answer: Option<IpAddr>,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn ok(label: &'static str, ip: [u8; 4]) -> Self {
            Self {
                label,
                answer: Some(IpAddr::V4(Ipv4Addr::from(ip))),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(label: &'static str) -> Self {
            Self {
                label,
                answer: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl ResolverStrategy for Scripted {
        fn label(&self) -> String {
            self.label.to_string()
        }

        fn lookup<'a>(&'a self, _name: &'a Name) -> Lookup<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let answer = self.answer;
            Box::pin(async move { answer.ok_or(ResolutionError::Lookup("SERVFAIL".into())) })
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_second_strategy() {
        let resolver = FallbackResolver::new(vec![
            Box::new(Scripted::failing("s1")),
            Box::new(Scripted::ok("s2", [10, 0, 0, 2])),
        ]);

        let resolved = resolver.lookup(&Name::new("itch.io")).await.unwrap();

        assert_eq!(resolved.addr, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(resolved.strategy, "s2");
        assert_eq!(resolved.failures.len(), 1);
        assert_eq!(resolved.failures[0].strategy, "s1");
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let third = Scripted::ok("s3", [10, 0, 0, 3]);
        let third_calls = third.calls.clone();
        let resolver = FallbackResolver::new(vec![
            Box::new(Scripted::ok("s1", [10, 0, 0, 1])),
            Box::new(third),
        ]);

        let resolved = resolver.lookup(&Name::new("itch.io")).await.unwrap();

        assert_eq!(resolved.addr, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(resolved.failures.is_empty());
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_fail_reports_every_strategy() {
        let resolver = FallbackResolver::new(vec![
            Box::new(Scripted::failing("s1")),
            Box::new(Scripted::failing("s2")),
            Box::new(Scripted::failing("s3")),
        ]);

        let err = resolver.lookup(&Name::new("itch.io")).await.unwrap_err();

        assert_eq!(err.hostname, "itch.io");
        let labels: Vec<_> = err.failures.iter().map(|f| f.strategy.as_str()).collect();
        assert_eq!(labels, vec!["s1", "s2", "s3"]);
    }

    #[tokio::test]
    async fn test_empty_chain_fails() {
        let resolver = FallbackResolver::new(vec![]);
        assert!(resolver.is_empty());

        let err = resolver.lookup(&Name::new("itch.io")).await.unwrap_err();
        assert!(err.failures.is_empty());
    }

    #[tokio::test]
    async fn test_no_caching_between_calls() {
        let only = Scripted::ok("s1", [10, 0, 0, 1]);
        let calls = only.calls.clone();
        let resolver = FallbackResolver::new(vec![Box::new(only)]);

        resolver.lookup(&Name::new("itch.io")).await.unwrap();
        resolver.lookup(&Name::new("itch.io")).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolve_trait_maps_failure_to_net_error() {
        let resolver = FallbackResolver::new(vec![Box::new(Scripted::failing("s1"))]);

        let err = Resolve::resolve(&resolver, Name::new("itch.io"))
            .await
            .err()
            .expect("resolution should fail");

        match err {
            NetError::NameNotResolvedFor { domain, .. } => assert_eq!(domain, "itch.io"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_trait_yields_single_address() {
        let resolver = FallbackResolver::new(vec![Box::new(Scripted::ok("s1", [10, 0, 0, 9]))]);

        let addrs: Vec<_> = Resolve::resolve(&resolver, Name::new("itch.io"))
            .await
            .unwrap()
            .collect();

        assert_eq!(addrs, vec![SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)), 0)]);
    }
}
