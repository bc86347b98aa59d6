//! Plain recursive DNS against a single nameserver, backed by hickory-dns.

use super::{Lookup, Name, ResolutionError, ResolverStrategy};
use hickory_resolver::{
    config::{LookupIpStrategy, NameServerConfigGroup, ResolverConfig},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    time::Duration,
};

/// Queries one nameserver for an A record.
///
/// The hickory resolver behind it is pinned to that single nameserver, makes
/// one attempt per query and keeps no answer cache, so every lookup goes to
/// the wire.
pub struct RecursiveStrategy {
    nameserver: SocketAddr,
    timeout: Duration,
    resolver: TokioResolver,
}

impl RecursiveStrategy {
    /// Nameserver on the standard port 53.
    pub fn new(nameserver: IpAddr, timeout: Duration) -> Self {
        Self::with_addr(SocketAddr::new(nameserver, 53), timeout)
    }

    pub fn with_addr(nameserver: SocketAddr, timeout: Duration) -> Self {
        let group =
            NameServerConfigGroup::from_ips_clear(&[nameserver.ip()], nameserver.port(), true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let mut builder =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default());
        let opts = builder.options_mut();
        opts.ip_strategy = LookupIpStrategy::Ipv4Only;
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        opts.ndots = 0;

        Self {
            nameserver,
            timeout,
            resolver: builder.build(),
        }
    }

    pub fn nameserver(&self) -> IpAddr {
        self.nameserver.ip()
    }
}

impl ResolverStrategy for RecursiveStrategy {
    fn label(&self) -> String {
        match self.nameserver.port() {
            53 => format!("recursive({})", self.nameserver.ip()),
            _ => format!("recursive({})", self.nameserver),
        }
    }

    fn lookup<'a>(&'a self, name: &'a Name) -> Lookup<'a> {
        Box::pin(async move {
            let domain = name.as_str();
            tracing::debug!(
                domain = %domain,
                nameserver = %self.nameserver,
                "recursive lookup"
            );

            // Outer bound in case the nameserver accepts TCP but never answers.
            let lookup = tokio::time::timeout(self.timeout * 2, self.resolver.lookup_ip(domain))
                .await
                .map_err(|_| ResolutionError::Timeout(self.timeout))?
                .map_err(|e| ResolutionError::Lookup(e.to_string()))?;

            lookup
                .iter()
                .next()
                .ok_or(ResolutionError::NoAddressRecord)
        })
    }
}

impl fmt::Debug for RecursiveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveStrategy")
            .field("nameserver", &self.nameserver)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
