//! Port for the object store behind the CDN cache.

use async_trait::async_trait;

use crate::domain::{AssetKey, OriginAsset};

use super::define_port_error;

define_port_error! {
    /// Errors raised by asset origins.
    pub enum AssetOriginError {
        /// The origin has no object under the key.
        NotFound => "asset not found at origin",
        /// The origin could not be reached or answered with a failure.
        Unavailable { message: String } => "asset origin unavailable: {message}",
    }
}

/// Object store holding CDN assets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetOrigin: Send + Sync {
    /// Fetch the object stored under `key`, body and caching headers.
    async fn fetch(&self, key: &AssetKey) -> Result<OriginAsset, AssetOriginError>;
}

/// Origin without objects, used when no origin URL is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAssetOrigin;

#[async_trait]
impl AssetOrigin for FixtureAssetOrigin {
    async fn fetch(&self, _key: &AssetKey) -> Result<OriginAsset, AssetOriginError> {
        Err(AssetOriginError::not_found())
    }
}
