//! HTTP Client with builder pattern.
//!
//! The client is where DNS policy is attached: the resolver handed to
//! [`ClientBuilder::resolver`] backs every connection the client opens, so
//! all callers sharing one `Client` share one resolution policy.
//!
//! # Example
//!
//! ```rust,ignore
//! use takedown_scout::{Client, dns::{FallbackResolver, StrategySpec}};
//! use std::{sync::Arc, time::Duration};
//!
//! let timeout = Duration::from_secs(5);
//! let chain = FallbackResolver::from_specs(&StrategySpec::default_chain(), timeout);
//! let client = Client::builder()
//!     .resolver(Arc::new(chain))
//!     .timeout(Duration::from_secs(30))
//!     .build();
//!
//! let resp = client.get("https://itch.io").send().await?;
//! ```

use crate::base::neterror::NetError;
use crate::dns::{GaiResolver, Resolve};
use crate::http::responsebody::DEFAULT_MAX_BODY_BYTES;
use crate::http::{HttpResponse, HttpStreamFactory};
use crate::socket::connectjob::ConnectJob;
use crate::socket::tls::TlsConfig;
use http::{HeaderMap, HeaderValue, Method, Request};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = concat!("takedown-scout/", env!("CARGO_PKG_VERSION"));

/// HTTP Client for making requests.
///
/// Use [`Client::builder()`] to configure and create a client. Cloning is
/// cheap and clones share the transport.
#[derive(Clone)]
pub struct Client {
    factory: Arc<HttpStreamFactory>,
    timeout: Option<Duration>,
    user_agent: HeaderValue,
    redirect_limit: u8,
    max_body_bytes: usize,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a new client using the system resolver.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Start building a GET request. Redirects are followed.
    pub fn get<U: AsRef<str>>(&self, url: U) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Start building a HEAD request. Redirects are not followed.
    pub fn head<U: AsRef<str>>(&self, url: U) -> RequestBuilder {
        self.request(Method::HEAD, url)
    }

    pub fn request<U: AsRef<str>>(&self, method: Method, url: U) -> RequestBuilder {
        let follow_redirects = method == Method::GET;
        RequestBuilder {
            client: self.clone(),
            method,
            url: url.as_ref().to_string(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            follow_redirects,
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("timeout", &self.timeout)
            .field("redirect_limit", &self.redirect_limit)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a [`Client`].
pub struct ClientBuilder {
    resolver: Option<Arc<dyn Resolve>>,
    tls_config: Option<TlsConfig>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    redirect_limit: u8,
    max_body_bytes: usize,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            resolver: None,
            tls_config: None,
            timeout: None,
            connect_timeout: None,
            user_agent: None,
            redirect_limit: 20,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ClientBuilder {
    /// Resolver used for every connection this client opens.
    pub fn resolver(mut self, resolver: Arc<dyn Resolve>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn tls_config(mut self, config: TlsConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Overall deadline for one request, redirects included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Deadline for each TCP connect attempt.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn redirect_limit(mut self, limit: u8) -> Self {
        self.redirect_limit = limit;
        self
    }

    /// Largest response body that will be buffered.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn build(self) -> Client {
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(GaiResolver::new()));

        let mut job = ConnectJob::new(resolver).with_tls(self.tls_config.unwrap_or_default());
        if let Some(timeout) = self.connect_timeout {
            job = job.with_connect_timeout(timeout);
        }

        let user_agent = self
            .user_agent
            .and_then(|ua| HeaderValue::from_str(&ua).ok())
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_USER_AGENT));

        Client {
            factory: Arc::new(HttpStreamFactory::new(job)),
            timeout: self.timeout,
            user_agent,
            redirect_limit: self.redirect_limit,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Builder for a single request.
pub struct RequestBuilder {
    client: Client,
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    follow_redirects: bool,
}

impl RequestBuilder {
    /// Add a header. Invalid values are ignored.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: http::header::IntoHeaderName,
        V: TryInto<HeaderValue>,
    {
        if let Ok(val) = value.try_into() {
            self.headers.insert(key, val);
        }
        self
    }

    /// Append a query parameter (percent-encoded on send).
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Send the request.
    pub async fn send(self) -> Result<HttpResponse, NetError> {
        let timeout = self.client.timeout;
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.run())
                .await
                .map_err(|_| NetError::ConnectionTimedOut)?,
            None => self.run().await,
        }
    }

    async fn run(self) -> Result<HttpResponse, NetError> {
        let mut url = Url::parse(&self.url).map_err(|_| NetError::InvalidUrl)?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        let mut redirects_left = self.client.redirect_limit;

        loop {
            // The itch API carries its key in the path; log the host only.
            tracing::debug!(
                method = %self.method,
                host = url.host_str().unwrap_or_default(),
                "sending request"
            );

            let mut stream = self.client.factory.request_stream(&url).await?;
            let response = stream.send_request(self.build_request(&url)?).await?;

            let location = if self.follow_redirects && response.status().is_redirection() {
                response
                    .headers()
                    .get(http::header::LOCATION)
                    .and_then(|loc| loc.to_str().ok())
                    .map(|loc| url.join(loc).map_err(|_| NetError::InvalidRedirect))
                    .transpose()?
            } else {
                None
            };

            match location {
                Some(next) => {
                    if redirects_left == 0 {
                        return Err(NetError::TooManyRedirects);
                    }
                    redirects_left -= 1;
                    tracing::debug!(
                        from = url.host_str().unwrap_or_default(),
                        to = next.host_str().unwrap_or_default(),
                        "following redirect"
                    );
                    url = next;
                }
                None => {
                    let body_limit = self.client.max_body_bytes;
                    return Ok(HttpResponse::from_hyper(response, url, body_limit));
                }
            }
        }
    }

    fn build_request(
        &self,
        url: &Url,
    ) -> Result<Request<http_body_util::Empty<bytes::Bytes>>, NetError> {
        // Origin-form target; the authority travels in Host.
        let mut target = url.path().to_string();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }

        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let mut req = Request::builder()
            .method(self.method.clone())
            .uri(target)
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|_| NetError::InvalidUrl)?;

        let headers = req.headers_mut();
        headers.insert(
            http::header::HOST,
            HeaderValue::from_str(&authority).map_err(|_| NetError::InvalidUrl)?,
        );
        headers.insert(http::header::USER_AGENT, self.client.user_agent.clone());
        headers.insert(http::header::ACCEPT, HeaderValue::from_static("*/*"));
        for (key, value) in self.headers.iter() {
            headers.insert(key.clone(), value.clone());
        }

        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_follows_redirects_head_does_not() {
        let client = Client::new();
        assert!(client.get("https://itch.io").follow_redirects);
        assert!(!client.head("https://itch.io/takedowns/1").follow_redirects);
    }

    #[test]
    fn test_build_request_uses_origin_form_and_host() {
        let client = Client::builder().user_agent("scout-test").build();
        let req = client
            .get("http://127.0.0.1:8080/api/games")
            .header("X-Trace", "1");
        let url = Url::parse("http://127.0.0.1:8080/api/games?page=2").unwrap();

        let built = req.build_request(&url).unwrap();

        assert_eq!(built.uri(), "/api/games?page=2");
        assert_eq!(built.headers()[http::header::HOST], "127.0.0.1:8080");
        assert_eq!(built.headers()[http::header::USER_AGENT], "scout-test");
        assert_eq!(built.headers()["x-trace"], "1");
    }

    #[test]
    fn test_default_port_omitted_from_host() {
        let client = Client::new();
        let url = Url::parse("https://itch.io/takedowns/42").unwrap();
        let built = client.head(url.as_str()).build_request(&url).unwrap();

        assert_eq!(built.method(), Method::HEAD);
        assert_eq!(built.headers()[http::header::HOST], "itch.io");
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let result = Client::new().get("not a url").send().await;
        assert!(matches!(result, Err(NetError::InvalidUrl)));
    }
}
