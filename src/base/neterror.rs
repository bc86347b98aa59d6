use std::sync::Arc;
use thiserror::Error;

/// Transport and HTTP level errors.
///
/// Struct variants carry the host, domain or URL the failure is about.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Connection to {host}:{port} failed: {source}")]
    ConnectionFailedTo {
        host: String,
        port: u16,
        #[source]
        source: Arc<std::io::Error>,
    },
    #[error("Connection timed out")]
    ConnectionTimedOut,
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name not resolved: {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("SSL handshake with {host} failed: {reason}")]
    SslHandshakeFailed { host: String, reason: String },

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unknown URL scheme")]
    UnknownUrlScheme,
    #[error("Invalid redirect")]
    InvalidRedirect,
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },
    #[error("Failed to read HTTP body")]
    HttpBodyError,
    #[error("Response body exceeds {limit} bytes")]
    ResponseTooLarge { limit: usize },
    #[error("Failed to parse JSON body: {0}")]
    JsonParseError(String),
    #[error("Response field missing: {0}")]
    MissingField(&'static str),
}

impl NetError {
    /// Context-rich connection failure.
    pub fn connection_failed_to(host: &str, port: u16, source: std::io::Error) -> Self {
        NetError::ConnectionFailedTo {
            host: host.to_string(),
            port,
            source: Arc::new(source),
        }
    }

    /// Context-rich DNS failure.
    pub fn dns_failed<E>(domain: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        NetError::NameNotResolvedFor {
            domain: domain.to_string(),
            source: Arc::new(source),
        }
    }

    /// True for failures that happened before any byte reached the peer
    /// (resolution, connect, TLS handshake).
    pub fn is_connect(&self) -> bool {
        matches!(
            self,
            NetError::ConnectionFailed
                | NetError::ConnectionFailedTo { .. }
                | NetError::NameNotResolved
                | NetError::NameNotResolvedFor { .. }
                | NetError::SslProtocolError
                | NetError::SslHandshakeFailed { .. }
        )
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
