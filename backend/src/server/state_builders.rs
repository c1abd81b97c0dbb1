//! Builders wiring settings into HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use mockable::DefaultClock;
use tracing::{info, warn};

use emote_portal::domain::UserProfileService;
use emote_portal::domain::ports::{AssetLookup, AssetOrigin, AssetOriginError};
use emote_portal::domain::{AssetKey, OriginAsset};
use emote_portal::inbound::http::state::{HttpState, HttpStatePorts};
use emote_portal::outbound::asset_cache::AssetCache;
use emote_portal::outbound::asset_origin::HttpAssetOrigin;
use emote_portal::outbound::catalogue::InMemoryCatalogue;
use emote_portal::settings::PortalSettings;

/// Origin used when no origin URL is configured; every fetch fails.
struct UnconfiguredOrigin;

#[async_trait]
impl AssetOrigin for UnconfiguredOrigin {
    async fn fetch(&self, _key: &AssetKey) -> Result<OriginAsset, AssetOriginError> {
        Err(AssetOriginError::unavailable("no asset origin configured"))
    }
}

fn build_catalogue(settings: &PortalSettings) -> std::io::Result<Arc<InMemoryCatalogue>> {
    let Some(path) = settings.seed_path.as_deref() else {
        warn!("no catalogue seed configured; serving an empty catalogue");
        return Ok(Arc::new(InMemoryCatalogue::default()));
    };
    InMemoryCatalogue::load(path)
        .map(Arc::new)
        .map_err(std::io::Error::other)
}

fn build_assets(settings: &PortalSettings) -> std::io::Result<Arc<dyn AssetLookup>> {
    let config = settings.cache_config().map_err(std::io::Error::other)?;
    let clock = Arc::new(DefaultClock);
    match settings.cdn_origin_url().map_err(std::io::Error::other)? {
        Some(base) => {
            info!(origin = %base, capacity_bytes = config.capacity_bytes, "asset cache enabled");
            let origin = HttpAssetOrigin::new(base, settings.cdn_origin_timeout())
                .map_err(std::io::Error::other)?;
            Ok(Arc::new(AssetCache::new(Arc::new(origin), clock, config)))
        }
        None => {
            warn!("no asset origin configured; CDN requests will answer 503");
            Ok(Arc::new(AssetCache::new(
                Arc::new(UnconfiguredOrigin),
                clock,
                config,
            )))
        }
    }
}

/// Build handler state from settings: the seeded catalogue, the profile
/// service over it and the asset cache.
///
/// # Errors
/// Returns [`std::io::Error`] when the seed cannot be read or decoded, or a
/// CDN setting is invalid.
pub(super) fn build_http_state(settings: &PortalSettings) -> std::io::Result<web::Data<HttpState>> {
    let catalogue = build_catalogue(settings)?;
    let service = Arc::new(UserProfileService::new(
        Arc::clone(&catalogue),
        Arc::clone(&catalogue),
        catalogue,
    ));
    let state = HttpState::new(HttpStatePorts {
        profile: service.clone(),
        catalogue: service,
        assets: build_assets(settings)?,
    });
    let state = match settings.cdn_purge_token() {
        Some(token) => state.with_purge_token(token),
        None => state,
    };
    Ok(web::Data::new(state))
}
