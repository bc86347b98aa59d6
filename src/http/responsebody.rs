//! Response body buffering.

use crate::base::neterror::NetError;
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;

/// Default cap on a buffered body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Response body wrapper. Buffering stops with
/// [`NetError::ResponseTooLarge`] once `limit` bytes are exceeded.
pub struct ResponseBody {
    inner: Incoming,
    limit: usize,
}

impl ResponseBody {
    pub fn new(inner: Incoming, limit: usize) -> Self {
        Self { inner, limit }
    }

    /// Read entire body as bytes.
    pub async fn bytes(self) -> Result<Bytes, NetError> {
        let limit = self.limit;
        let collected = Limited::new(self.inner, limit)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    NetError::ResponseTooLarge { limit }
                } else {
                    NetError::HttpBodyError
                }
            })?;
        Ok(collected.to_bytes())
    }

    /// Read body as text. Invalid UTF-8 is replaced rather than rejected;
    /// pages are only ever searched, never round-tripped.
    pub async fn text(self) -> Result<String, NetError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read body as JSON, deserializing to type T.
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> Result<T, NetError> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| NetError::JsonParseError(e.to_string()))
    }
}
