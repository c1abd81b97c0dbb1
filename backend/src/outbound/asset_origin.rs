//! Reqwest-backed asset origin.
//!
//! Fetches objects from an HTTP object store by appending the asset key's
//! segments to a base URL. The adapter owns transport details only: URL building, status
//! mapping and copying the caching headers into an [`OriginAsset`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, HeaderMap, HeaderName};
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{AssetOrigin, AssetOriginError};
use crate::domain::{AssetKey, OriginAsset};

const USER_AGENT: &str = "emote-portal-cdn/0.1";

/// Origin adapter reading objects below one base URL.
pub struct HttpAssetOrigin {
    client: Client,
    base: Url,
}

impl HttpAssetOrigin {
    /// Build an adapter whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base })
    }

    /// Segments are appended and percent-encoded one by one, so a key can
    /// never change the host or climb above the base path.
    fn object_url(&self, key: &AssetKey) -> Result<Url, AssetOriginError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AssetOriginError::unavailable("origin URL cannot carry a path"))?
            .pop_if_empty()
            .extend(key.as_str().split('/'));
        Ok(url)
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn map_transport_error(error: &reqwest::Error) -> AssetOriginError {
    if error.is_timeout() {
        AssetOriginError::unavailable(format!("timed out: {error}"))
    } else {
        AssetOriginError::unavailable(error.to_string())
    }
}

fn map_status(status: StatusCode) -> Result<(), AssetOriginError> {
    match status {
        _ if status.is_success() => Ok(()),
        StatusCode::NOT_FOUND | StatusCode::GONE => Err(AssetOriginError::not_found()),
        _ => Err(AssetOriginError::unavailable(format!(
            "status {}",
            status.as_u16()
        ))),
    }
}

#[async_trait]
impl AssetOrigin for HttpAssetOrigin {
    async fn fetch(&self, key: &AssetKey) -> Result<OriginAsset, AssetOriginError> {
        let url = self.object_url(key)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| map_transport_error(&err))?;
        map_status(response.status())?;

        let headers = response.headers();
        let content_type = header_value(headers, CONTENT_TYPE);
        let cache_control = header_value(headers, CACHE_CONTROL);
        let expires = header_value(headers, EXPIRES);
        let data = response
            .bytes()
            .await
            .map_err(|err| map_transport_error(&err))?;

        Ok(OriginAsset {
            data,
            content_type,
            cache_control,
            expires,
        })
    }
}
