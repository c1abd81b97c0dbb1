//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{AssetLookup, CatalogueQuery, UserProfileQuery};

/// Parameter object bundling the port implementations handlers call.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub profile: Arc<dyn UserProfileQuery>,
    pub catalogue: Arc<dyn CatalogueQuery>,
    pub assets: Arc<dyn AssetLookup>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub profile: Arc<dyn UserProfileQuery>,
    pub catalogue: Arc<dyn CatalogueQuery>,
    pub assets: Arc<dyn AssetLookup>,
    /// Source of "now" for event windows and `Age` headers.
    pub clock: Arc<dyn Clock>,
    /// Bearer token accepted by the purge endpoint; purging is disabled
    /// when unset.
    pub purge_token: Option<Arc<str>>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state reading the system clock, with purging disabled.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use emote_portal::domain::UserProfileService;
    /// use emote_portal::domain::ports::FixtureAssetOrigin;
    /// use emote_portal::inbound::http::state::{HttpState, HttpStatePorts};
    /// use emote_portal::outbound::asset_cache::{AssetCache, AssetCacheConfig};
    /// use emote_portal::outbound::catalogue::InMemoryCatalogue;
    /// use mockable::DefaultClock;
    ///
    /// let catalogue = Arc::new(InMemoryCatalogue::default());
    /// let service = Arc::new(UserProfileService::new(
    ///     Arc::clone(&catalogue),
    ///     Arc::clone(&catalogue),
    ///     catalogue,
    /// ));
    /// let assets = AssetCache::new(
    ///     Arc::new(FixtureAssetOrigin),
    ///     Arc::new(DefaultClock),
    ///     AssetCacheConfig::default(),
    /// );
    /// let state = HttpState::new(HttpStatePorts {
    ///     profile: service.clone(),
    ///     catalogue: service,
    ///     assets: Arc::new(assets),
    /// });
    /// assert!(state.purge_token.is_none());
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            profile,
            catalogue,
            assets,
        } = ports;
        Self {
            profile,
            catalogue,
            assets,
            clock: Arc::new(DefaultClock),
            purge_token: None,
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Enable the purge endpoint for callers presenting `token`.
    #[must_use]
    pub fn with_purge_token(mut self, token: impl Into<Arc<str>>) -> Self {
        self.purge_token = Some(token.into());
        self
    }
}
