//! # takedown-scout
//!
//! Finds games in a paginated catalog that were taken down from itch.io.
//!
//! Two pieces do the heavy lifting:
//!
//! - **Resolution**: every connection the [`Client`] opens resolves its host
//!   through a [`dns::FallbackResolver`], an ordered chain of recursive and
//!   DNS-over-HTTPS strategies. The first answer wins; the URL's port, SNI
//!   host and request are left untouched.
//! - **Discovery**: [`discovery::DiscoveryPipeline`] walks the catalog page by
//!   page, probes every game with [`itch::ItchClient::is_taken_down`] and
//!   checkpoints after each page so an interrupted run resumes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::{sync::Arc, time::Duration};
//! use takedown_scout::{Client, dns::{FallbackResolver, StrategySpec}, itch::ItchClient};
//!
//! let timeout = Duration::from_secs(5);
//! let chain = FallbackResolver::from_specs(&StrategySpec::default_chain(), timeout);
//! let client = Client::builder().resolver(Arc::new(chain)).build();
//! let itch = ItchClient::new(client, "api-key");
//! let gone = itch.is_taken_down(1234).await?;
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error type and error context helpers
//! - [`dns`] - Resolver strategies and the fallback chain
//! - [`socket`] - Resolver-aware connect and TLS
//! - [`http`] - HTTP/1.1 streams and responses
//! - [`itch`] - itch.io API, site and takedown probe
//! - [`catalog`] - The paginated game catalog
//! - [`discovery`] - Checkpointed catalog walk
//! - [`config`] - Runtime configuration

pub mod base;
pub mod catalog;
pub mod client;
pub mod config;
pub mod discovery;
pub mod dns;
pub mod http;
pub mod itch;
pub mod socket;

pub use client::{Client, ClientBuilder, RequestBuilder};
