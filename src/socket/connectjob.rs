use crate::base::neterror::NetError;
use crate::dns::{parse_ip_literal, with_port, GaiResolver, Name, Resolve};
use crate::socket::stream::BoxedSocket;
use crate::socket::tls::TlsConfig;
use boring::ssl::{SslConnector, SslMethod};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use url::Url;

/// Manages the connection process: DNS -> TCP -> SSL.
/// Roughly equivalent to net::ConnectJob.
///
/// The resolver is injected at construction. Every connection opened through
/// a job asks that resolver for the target host, substitutes the answer and
/// keeps the URL port, the SNI host and everything above the socket as they
/// were. A resolver failure comes back as an ordinary `NetError`.
#[derive(Clone)]
pub struct ConnectJob {
    resolver: Arc<dyn Resolve>,
    tls: TlsConfig,
    connect_timeout: Duration,
}

impl Default for ConnectJob {
    fn default() -> Self {
        Self::new(Arc::new(GaiResolver::new()))
    }
}

impl ConnectJob {
    pub fn new(resolver: Arc<dyn Resolve>) -> Self {
        Self {
            resolver,
            tls: TlsConfig::default(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub async fn connect(&self, url: &Url) -> Result<BoxedSocket, NetError> {
        let https = match url.scheme() {
            "https" => true,
            "http" => false,
            _ => return Err(NetError::UnknownUrlScheme),
        };
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

        // 1. DNS Resolution
        let addrs = self.resolve_target(host, port).await?;

        // 2. TCP Connect
        let stream = self.connect_first(host, port, &addrs).await?;

        // 3. SSL Handshake (if https)
        if !https {
            return Ok(BoxedSocket::plain(stream));
        }

        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        self.tls.apply_to_builder(&mut builder)?;

        let connector = builder.build();
        let mut config = connector
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;
        config.set_use_server_name_indication(TlsConfig::should_set_sni(host));

        let tls_stream = tokio_boring::connect(config, host, stream)
            .await
            .map_err(|e| {
                tracing::debug!(host = %host, error = %e, "TLS handshake failed");
                NetError::SslHandshakeFailed {
                    host: host.to_string(),
                    reason: e.to_string(),
                }
            })?;

        Ok(BoxedSocket::tls(tls_stream))
    }

    /// Resolve `host` and pair every address with `port`.
    pub async fn resolve_target(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, NetError> {
        if let Some(ip) = parse_ip_literal(host) {
            return Ok(vec![SocketAddr::new(ip, port)]);
        }

        let addrs = with_port(self.resolver.resolve(Name::new(host)).await?, port);
        if addrs.is_empty() {
            return Err(NetError::NameNotResolved);
        }

        tracing::debug!(host = %host, port, addrs = ?addrs, "substituting resolved address");
        Ok(addrs)
    }

    async fn connect_first(
        &self,
        host: &str,
        port: u16,
        addrs: &[SocketAddr],
    ) -> Result<TcpStream, NetError> {
        let mut last_err = None;

        for addr in addrs {
            match tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => return Ok(stream),
                Ok(Err(e)) => {
                    tracing::debug!(host = %host, %addr, error = %e, "TCP connect failed");
                    last_err = Some(e);
                }
                Err(_) => {
                    tracing::debug!(host = %host, %addr, "TCP connect timed out");
                    last_err = Some(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "connect timed out",
                    ));
                }
            }
        }

        match last_err {
            Some(e) => Err(NetError::connection_failed_to(host, port, e)),
            None => Err(NetError::ConnectionFailed),
        }
    }
}
