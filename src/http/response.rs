//! HTTP Response with body access.

use crate::base::neterror::NetError;
use crate::http::ResponseBody;
use http::{HeaderMap, StatusCode};
use hyper::body::Incoming;
use url::Url;

/// HTTP Response with accessible body.
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Option<ResponseBody>,
}

impl HttpResponse {
    /// Create from hyper Response<Incoming> received for `url`, buffering at
    /// most `body_limit` bytes of body.
    pub fn from_hyper(resp: http::Response<Incoming>, url: Url, body_limit: usize) -> Self {
        let (parts, body) = resp.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            url,
            body: Some(ResponseBody::new(body, body_limit)),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final URL, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Turn a non-2xx status into `NetError::HttpStatus`.
    ///
    /// The query string is dropped from the reported URL since it may hold
    /// credentials.
    pub fn error_for_status(self) -> Result<Self, NetError> {
        if self.status.is_success() {
            return Ok(self);
        }
        let mut url = self.url.clone();
        url.set_query(None);
        Err(NetError::HttpStatus {
            status: self.status.as_u16(),
            url: url.to_string(),
        })
    }

    pub async fn bytes(mut self) -> Result<bytes::Bytes, NetError> {
        self.body.take().ok_or(NetError::HttpBodyError)?.bytes().await
    }

    pub async fn text(mut self) -> Result<String, NetError> {
        self.body.take().ok_or(NetError::HttpBodyError)?.text().await
    }

    pub async fn json<T: serde::de::DeserializeOwned>(mut self) -> Result<T, NetError> {
        self.body.take().ok_or(NetError::HttpBodyError)?.json().await
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}
