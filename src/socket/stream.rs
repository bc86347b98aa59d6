//! Socket abstraction over plain TCP and TLS streams.
//!
//! The stream factory hands hyper one concrete type regardless of scheme;
//! `BoxedSocket` is that type.

use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_boring::SslStream;

/// A trait for any socket that supports async read/write operations.
pub trait StreamSocket: AsyncRead + AsyncWrite + Unpin + Send + Sync + 'static {}

impl StreamSocket for TcpStream {}

impl<S: StreamSocket> StreamSocket for SslStream<S> {}

/// A boxed dynamic StreamSocket.
pub struct BoxedSocket {
    inner: Pin<Box<dyn StreamSocket>>,
    tls: bool,
}

impl BoxedSocket {
    /// Wrap a plain TCP stream.
    pub fn plain(socket: TcpStream) -> Self {
        Self {
            inner: Box::pin(socket),
            tls: false,
        }
    }

    /// Wrap an established TLS stream.
    pub fn tls<S: StreamSocket>(socket: SslStream<S>) -> Self {
        Self {
            inner: Box::pin(socket),
            tls: true,
        }
    }

    /// Whether the socket carries TLS.
    pub fn is_tls(&self) -> bool {
        self.tls
    }
}

impl AsyncRead for BoxedSocket {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

impl AsyncWrite for BoxedSocket {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.inner.as_mut().poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_shutdown(cx)
    }
}
