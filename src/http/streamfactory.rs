use crate::base::neterror::NetError;
use crate::socket::connectjob::ConnectJob;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Empty;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use url::Url;

/// Wraps one HTTP/1.1 connection.
pub struct HttpStream {
    sender: http1::SendRequest<Empty<Bytes>>,
}

impl HttpStream {
    /// Only bodiless requests (GET, HEAD) are sent by this crate.
    pub async fn send_request(
        &mut self,
        req: Request<Empty<Bytes>>,
    ) -> Result<Response<Incoming>, NetError> {
        self.sender.send_request(req).await.map_err(|e| {
            tracing::debug!(error = %e, "request failed on established connection");
            NetError::ConnectionClosed
        })
    }
}

/// Opens a fresh connection per request through the injected connect job.
pub struct HttpStreamFactory {
    connect_job: ConnectJob,
}

impl HttpStreamFactory {
    pub fn new(connect_job: ConnectJob) -> Self {
        Self { connect_job }
    }

    pub async fn request_stream(&self, url: &Url) -> Result<HttpStream, NetError> {
        // 1. Get raw socket (DNS policy applies here)
        let socket = self.connect_job.connect(url).await?;
        tracing::debug!(
            host = url.host_str().unwrap_or_default(),
            tls = socket.is_tls(),
            "connected"
        );

        // 2. Handshake
        let io = TokioIo::new(socket);
        let (sender, conn) = http1::handshake(io).await.map_err(|e| {
            tracing::debug!(error = %e, "HTTP/1.1 handshake failed");
            NetError::ConnectionFailed
        })?;

        // 3. Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection driver ended with error");
            }
        });

        Ok(HttpStream { sender })
    }
}
