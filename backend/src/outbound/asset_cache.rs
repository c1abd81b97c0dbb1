//! Coalescing, capacity-bounded cache in front of an [`AssetOrigin`].
//!
//! Concurrent lookups of one key share a single origin request: the first
//! caller becomes the leader and fetches, later callers follow and receive
//! the leader's result. The fetch runs on its own task, so it completes even
//! when the leading request goes away; a fetch that panics releases its
//! followers with an uncacheable "unavailable" response.
//!
//! Storage is a [`moka`] cache weighed by body size, with every entry
//! expiring after its own `max_age`. A purge that lands while a fetch is in
//! flight detaches that fetch, so the body it read is never kept.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mockable::Clock;
use moka::Expiry;
use moka::future::Cache;
use tokio::sync::{Semaphore, watch};
use tracing::{debug, error, warn};

use crate::domain::ports::{AssetLookup, AssetOrigin, AssetOriginError};
use crate::domain::{AssetKey, CachedAsset, TraceId};

/// Default cache capacity: 512 MiB of bodies.
pub const DEFAULT_CAPACITY_BYTES: u64 = 512 * 1024 * 1024;
/// Default upper bound on one origin request.
pub const DEFAULT_ORIGIN_TIMEOUT: Duration = Duration::from_secs(5);
/// Default number of origin requests allowed in flight.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 64;

/// Tuning for [`AssetCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetCacheConfig {
    /// Total body bytes kept; `0` disables the bound.
    pub capacity_bytes: u64,
    pub origin_timeout: Duration,
    pub max_concurrent_requests: usize,
}

impl Default for AssetCacheConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            origin_timeout: DEFAULT_ORIGIN_TIMEOUT,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

struct MaxAgeExpiry;

impl Expiry<AssetKey, CachedAsset> for MaxAgeExpiry {
    fn expire_after_create(
        &self,
        _key: &AssetKey,
        value: &CachedAsset,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.max_age)
    }
}

fn weigh(_key: &AssetKey, asset: &CachedAsset) -> u32 {
    u32::try_from(asset.weight()).unwrap_or(u32::MAX)
}

type InflightReceiver = watch::Receiver<Option<CachedAsset>>;

struct InflightSlot {
    receiver: InflightReceiver,
    purged: Arc<AtomicBool>,
}

type InflightMap = Arc<Mutex<HashMap<AssetKey, InflightSlot>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases followers and clears the in-flight slot however the leader
/// finishes.
struct LeaderGuard {
    inflight: InflightMap,
    key: AssetKey,
    sender: watch::Sender<Option<CachedAsset>>,
    purged: Arc<AtomicBool>,
}

impl LeaderGuard {
    fn was_purged(&self) -> bool {
        self.purged.load(Ordering::SeqCst)
    }

    fn publish(self, asset: &CachedAsset) {
        self.sender.send_replace(Some(asset.clone()));
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        let mut inflight = lock(&self.inflight);
        // A purge may already have replaced the slot with a newer leader's.
        if inflight
            .get(&self.key)
            .is_some_and(|slot| Arc::ptr_eq(&slot.purged, &self.purged))
        {
            inflight.remove(&self.key);
        }
        // Dropping the sender without a value wakes followers with an error.
    }
}

enum Lookup {
    Hit(CachedAsset),
    Follow(InflightReceiver),
    Lead(LeaderGuard),
}

/// Cache implementing [`AssetLookup`] over an origin.
pub struct AssetCache<O> {
    origin: Arc<O>,
    clock: Arc<dyn Clock>,
    store: Cache<AssetKey, CachedAsset>,
    inflight: InflightMap,
    permits: Arc<Semaphore>,
    origin_timeout: Duration,
}

impl<O> AssetCache<O> {
    /// Build a cache in front of `origin`.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use emote_portal::domain::ports::FixtureAssetOrigin;
    /// # use emote_portal::outbound::asset_cache::{AssetCache, AssetCacheConfig};
    /// let cache = AssetCache::new(
    ///     Arc::new(FixtureAssetOrigin),
    ///     Arc::new(DefaultClock),
    ///     AssetCacheConfig::default(),
    /// );
    /// assert_eq!(cache.used_bytes(), 0);
    /// ```
    pub fn new(origin: Arc<O>, clock: Arc<dyn Clock>, config: AssetCacheConfig) -> Self {
        let capacity = if config.capacity_bytes == 0 {
            warn!("asset cache capacity is 0; the cache is unbounded");
            u64::MAX
        } else {
            config.capacity_bytes
        };
        let store = Cache::builder()
            .weigher(weigh)
            .expire_after(MaxAgeExpiry)
            .max_capacity(capacity)
            .build();
        Self {
            origin,
            clock,
            store,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            permits: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
            origin_timeout: config.origin_timeout,
        }
    }

    /// Bytes held by stored bodies, as of the last maintenance run.
    pub fn used_bytes(&self) -> u64 {
        self.store.weighted_size()
    }

    /// Stored entries, as of the last maintenance run.
    pub fn entry_count(&self) -> u64 {
        self.store.entry_count()
    }

    /// Apply pending evictions and expirations now.
    pub async fn run_pending_tasks(&self) {
        self.store.run_pending_tasks().await;
    }

    /// Stored entry for `key` unless it outlived its `max_age`.
    async fn fresh(&self, key: &AssetKey) -> Option<CachedAsset> {
        let asset = self.store.get(key).await?;
        if asset.is_expired(self.clock.utc()) {
            self.store.invalidate(key).await;
            return None;
        }
        Some(asset)
    }

    async fn begin(&self, key: &AssetKey) -> Lookup {
        if let Some(asset) = self.fresh(key).await {
            return Lookup::Hit(asset);
        }
        let mut inflight = lock(&self.inflight);
        if let Some(slot) = inflight.get(key) {
            return Lookup::Follow(slot.receiver.clone());
        }
        let (sender, receiver) = watch::channel(None);
        let purged = Arc::new(AtomicBool::new(false));
        inflight.insert(
            key.clone(),
            InflightSlot {
                receiver,
                purged: Arc::clone(&purged),
            },
        );
        Lookup::Lead(LeaderGuard {
            inflight: Arc::clone(&self.inflight),
            key: key.clone(),
            sender,
            purged,
        })
    }

    async fn follow(&self, mut receiver: InflightReceiver) -> CachedAsset {
        loop {
            if let Some(asset) = receiver.borrow_and_update().clone() {
                return asset;
            }
            if receiver.changed().await.is_err() {
                if let Some(asset) = receiver.borrow().clone() {
                    return asset;
                }
                warn!("asset leader gave up before publishing");
                return CachedAsset::unavailable(self.clock.utc());
            }
        }
    }
}

async fn fetch_from_origin<O: AssetOrigin>(
    origin: &O,
    clock: &dyn Clock,
    permits: &Semaphore,
    origin_timeout: Duration,
    key: &AssetKey,
) -> CachedAsset {
    let Ok(_permit) = permits.acquire().await else {
        return CachedAsset::unavailable(clock.utc());
    };
    let outcome = tokio::time::timeout(origin_timeout, origin.fetch(key)).await;
    let now = clock.utc();
    match outcome {
        Ok(Ok(asset)) => CachedAsset::from_origin(asset, now),
        Ok(Err(AssetOriginError::NotFound)) => CachedAsset::not_found(now),
        Ok(Err(err)) => {
            warn!(key = %key, error = %err, "asset origin failed");
            CachedAsset::unavailable(now)
        }
        Err(_) => {
            warn!(
                key = %key,
                timeout_ms = u64::try_from(origin_timeout.as_millis()).unwrap_or(u64::MAX),
                "asset origin timed out"
            );
            CachedAsset::unavailable(now)
        }
    }
}

impl<O: AssetOrigin + 'static> AssetCache<O> {
    /// Fetch on a task of its own so the result still reaches followers and
    /// the cache when the leading request is dropped.
    async fn lead(&self, key: &AssetKey, guard: LeaderGuard) -> CachedAsset {
        let origin = Arc::clone(&self.origin);
        let clock = Arc::clone(&self.clock);
        let permits = Arc::clone(&self.permits);
        let store = self.store.clone();
        let origin_timeout = self.origin_timeout;
        let owned_key = key.clone();

        let task = TraceId::inherit(async move {
            // The previous leader may have stored the key after our miss.
            if let Some(asset) = store
                .get(&owned_key)
                .await
                .filter(|asset| !asset.is_expired(clock.utc()))
            {
                guard.publish(&asset);
                return asset;
            }
            let asset = fetch_from_origin(
                origin.as_ref(),
                clock.as_ref(),
                &permits,
                origin_timeout,
                &owned_key,
            )
            .await;
            if asset.is_cacheable() {
                // Insert before checking: a purge flags the slot before it
                // invalidates, so one of the two always removes this body.
                store.insert(owned_key.clone(), asset.clone()).await;
                if guard.was_purged() {
                    store.invalidate(&owned_key).await;
                    debug!(key = %owned_key, "asset purged during fetch; not kept");
                }
            }
            guard.publish(&asset);
            asset
        });

        match tokio::spawn(task).await {
            Ok(asset) => asset,
            Err(err) => {
                error!(key = %key, error = %err, "asset fetch task failed");
                CachedAsset::unavailable(self.clock.utc())
            }
        }
    }
}

#[async_trait]
impl<O: AssetOrigin + 'static> AssetLookup for AssetCache<O> {
    async fn lookup(&self, key: &AssetKey) -> CachedAsset {
        match self.begin(key).await {
            Lookup::Hit(asset) => asset,
            Lookup::Follow(receiver) => self.follow(receiver).await,
            Lookup::Lead(guard) => self.lead(key, guard).await,
        }
    }

    async fn purge(&self, key: &AssetKey) {
        let detached = lock(&self.inflight).remove(key);
        if let Some(slot) = detached {
            slot.purged.store(true, Ordering::SeqCst);
            debug!(key = %key, "purge detached an in-flight fetch");
        }
        self.store.invalidate(key).await;
        debug!(key = %key, "purged cached asset");
    }
}

#[cfg(test)]
mod tests;
