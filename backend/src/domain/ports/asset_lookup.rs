//! Driving port for CDN lookups.

use async_trait::async_trait;

use crate::domain::{AssetKey, CachedAsset};

/// Cached asset delivery.
///
/// Lookups never fail: origin failures are reported as
/// [`crate::domain::AssetBody::Unavailable`] so the HTTP layer can answer
/// with an uncacheable error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetLookup: Send + Sync {
    /// Return the asset stored under `key`, fetching it on a miss.
    async fn lookup(&self, key: &AssetKey) -> CachedAsset;

    /// Drop any cached entry for `key`.
    async fn purge(&self, key: &AssetKey);
}
