//! DNS Resolution Module
//!
//! Provides pluggable DNS resolution with support for:
//! - Recursive DNS against one nameserver (hickory-dns)
//! - DNS-over-HTTPS against one endpoint
//! - An ordered fallback chain over those strategies
//! - System resolver (getaddrinfo via thread pool) for bootstrapping
//! - Hostname-to-IP override table
//!
//! # Architecture
//!
//! Two traits meet here. [`ResolverStrategy`] is one mechanism producing one
//! address; [`FallbackResolver`] composes strategies. [`Resolve`] is what the
//! transport consumes; `FallbackResolver` implements it, which is how the
//! chain ends up governing every connection the HTTP client opens.
//!
//! # Example
//!
//! ```rust,ignore
//! use takedown_scout::dns::{FallbackResolver, Name, StrategySpec};
//! use std::time::Duration;
//!
//! let timeout = Duration::from_secs(5);
//! let chain = FallbackResolver::from_specs(&StrategySpec::default_chain(), timeout);
//! let resolved = chain.lookup(&Name::new("itch.io")).await?;
//! println!("{} via {}", resolved.addr, resolved.strategy);
//! ```

mod doh;
mod fallback;
mod gai;
mod recursive;
mod resolve;
mod strategy;

pub use doh::{encode_query, first_a_record, DohStrategy};
pub use fallback::{AllResolutionFailed, FallbackResolver, Resolved, StrategyFailure};
pub use gai::{parse_ip_literal, with_port, GaiResolver};
pub use recursive::RecursiveStrategy;
pub use resolve::{Addrs, DnsResolverWithOverrides, Name, Resolve, Resolving};
pub use strategy::{Lookup, ResolutionError, ResolverStrategy, StrategySpec};
