//! Core DNS resolution types and traits.
//!
//! This module defines the transport-facing `Resolve` trait. The connect job
//! only ever talks to a `Resolve`; which mechanism sits behind it (a fallback
//! chain, the system resolver, a static override table) is decided once, when
//! the client is built.

use crate::base::neterror::NetError;
use std::{
    collections::HashMap,
    fmt,
    future::Future,
    net::{IpAddr, SocketAddr},
    pin::Pin,
    sync::Arc,
};

/// A domain name to resolve into IP addresses.
///
/// This is a lightweight wrapper around a hostname string that provides
/// a type-safe way to pass domain names to resolvers.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Alias for an `Iterator` trait object over `SocketAddr`.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Alias for the `Future` type returned by a DNS resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, NetError>> + Send>>;

/// Trait for DNS resolution as seen by the transport.
///
/// - Uses `&self` so one resolver can serve every connection.
/// - Returns boxed futures for trait object compatibility.
/// - Returned addresses carry port 0; the connect job applies the URL port.
pub trait Resolve: Send + Sync {
    /// Resolves a domain name to IP addresses.
    fn resolve(&self, name: Name) -> Resolving;
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}

/// DNS resolver wrapper that supports hostname overrides.
///
/// Hostnames present in the override table resolve to the configured
/// addresses without touching the network; everything else goes to the inner
/// resolver. Backs the `hosts` section of the configuration.
pub struct DnsResolverWithOverrides {
    inner: Arc<dyn Resolve>,
    overrides: Arc<HashMap<String, Vec<IpAddr>>>,
}

impl DnsResolverWithOverrides {
    /// Creates a new resolver with the given overrides.
    ///
    /// Keys are matched case-insensitively.
    pub fn new(inner: Arc<dyn Resolve>, overrides: HashMap<String, Vec<IpAddr>>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(host, ips)| (host.to_ascii_lowercase(), ips))
            .collect();
        Self {
            inner,
            overrides: Arc::new(overrides),
        }
    }

    /// Returns the number of configured overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl Resolve for DnsResolverWithOverrides {
    fn resolve(&self, name: Name) -> Resolving {
        if let Some(ips) = self.overrides.get(&name.as_str().to_ascii_lowercase()) {
            tracing::debug!(domain = %name, "using static host override");
            let addrs: Vec<SocketAddr> = ips.iter().map(|ip| SocketAddr::new(*ip, 0)).collect();
            let addrs: Addrs = Box::new(addrs.into_iter());
            return Box::pin(std::future::ready(Ok(addrs)));
        }
        self.inner.resolve(name)
    }
}

impl fmt::Debug for DnsResolverWithOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsResolverWithOverrides")
            .field("override_count", &self.overrides.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_name_from_str() {
        let name = Name::from("itch.io");
        assert_eq!(name.as_str(), "itch.io");
        assert_eq!(name.to_string(), "itch.io");
    }

    #[test]
    fn test_name_equality() {
        assert_eq!(Name::new("itch.io"), Name::from(String::from("itch.io")));
        assert_ne!(Name::new("itch.io"), Name::new("api.itch.io"));
    }

    struct MockResolver {
        response: Vec<SocketAddr>,
    }

    impl Resolve for MockResolver {
        fn resolve(&self, _name: Name) -> Resolving {
            let addrs = self.response.clone();
            Box::pin(async move { Ok(Box::new(addrs.into_iter()) as Addrs) })
        }
    }

    fn mock() -> Arc<MockResolver> {
        Arc::new(MockResolver {
            response: vec![SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 0)],
        })
    }

    #[tokio::test]
    async fn test_override_resolver_hit_is_case_insensitive() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "Catalog.Local".to_string(),
            vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
        );

        let resolver = DnsResolverWithOverrides::new(mock(), overrides);
        assert_eq!(resolver.override_count(), 1);

        let addrs: Vec<_> = resolver
            .resolve(Name::new("catalog.local"))
            .await
            .unwrap()
            .collect();

        assert_eq!(addrs, vec![SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)]);
    }

    #[tokio::test]
    async fn test_override_resolver_miss() {
        let resolver = DnsResolverWithOverrides::new(mock(), HashMap::new());

        let addrs: Vec<_> = resolver
            .resolve(Name::new("itch.io"))
            .await
            .unwrap()
            .collect();

        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].ip(), IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)));
    }
}
