//! Tests for the coalescing asset cache.

use std::sync::atomic::AtomicUsize;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use futures::future::join_all;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockAssetOrigin;
use crate::domain::{AssetBody, NOT_FOUND_MAX_AGE, OriginAsset};
use crate::test_support::MutableClock;

fn key(raw: &str) -> AssetKey {
    AssetKey::new(raw).expect("valid key")
}

fn webp(body: &'static [u8], cache_control: Option<&str>) -> OriginAsset {
    OriginAsset {
        data: Bytes::from_static(body),
        content_type: Some("image/webp".to_owned()),
        cache_control: cache_control.map(str::to_owned),
        expires: None,
    }
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    let start = Utc
        .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    Arc::new(MutableClock::new(start))
}

fn cache<O: AssetOrigin>(
    origin: O,
    clock: &Arc<MutableClock>,
    config: AssetCacheConfig,
) -> AssetCache<O> {
    let clock: Arc<dyn Clock> = Arc::clone(clock) as Arc<dyn Clock>;
    AssetCache::new(Arc::new(origin), clock, config)
}

/// Origin that answers after a delay and counts its requests.
struct SlowOrigin {
    delay: Duration,
    fetches: Arc<AtomicUsize>,
    panics: bool,
}

#[async_trait]
impl AssetOrigin for SlowOrigin {
    async fn fetch(&self, _key: &AssetKey) -> Result<OriginAsset, AssetOriginError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.panics {
            panic!("origin exploded");
        }
        Ok(webp(b"slow", None))
    }
}

#[rstest]
#[tokio::test]
async fn second_lookup_is_served_from_cache(clock: Arc<MutableClock>) {
    let mut origin = MockAssetOrigin::new();
    origin
        .expect_fetch()
        .times(1)
        .returning(|_| Ok(webp(b"wave", Some("max-age=60"))));
    let cache = cache(origin, &clock, AssetCacheConfig::default());
    let emote = key("emote/wave/1x.webp");

    let first = cache.lookup(&emote).await;
    assert_eq!(first.record_delivery(), 0);
    let second = cache.lookup(&emote).await;
    assert_eq!(second.record_delivery(), 1);
    assert_eq!(second.max_age, Duration::from_secs(60));
    cache.run_pending_tasks().await;
    assert_eq!(cache.used_bytes(), 4);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn concurrent_lookups_share_one_origin_request(clock: Arc<MutableClock>) {
    let fetches = Arc::new(AtomicUsize::new(0));
    let origin = SlowOrigin {
        delay: Duration::from_millis(200),
        fetches: Arc::clone(&fetches),
        panics: false,
    };
    let cache = cache(origin, &clock, AssetCacheConfig::default());
    let emote = key("emote/slow/4x.webp");

    let results = join_all((0..8).map(|_| cache.lookup(&emote))).await;

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    for asset in results {
        assert!(matches!(asset.body, AssetBody::Bytes { .. }));
    }
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn panicking_fetch_releases_followers(clock: Arc<MutableClock>) {
    let origin = SlowOrigin {
        delay: Duration::from_millis(50),
        fetches: Arc::new(AtomicUsize::new(0)),
        panics: true,
    };
    let cache = cache(origin, &clock, AssetCacheConfig::default());
    let emote = key("emote/boom/1x.webp");

    let results = join_all((0..3).map(|_| cache.lookup(&emote))).await;

    for asset in results {
        assert_eq!(asset.body, AssetBody::Unavailable);
        assert!(!asset.is_cacheable());
    }
    cache.run_pending_tasks().await;
    assert_eq!(cache.entry_count(), 0);
}

#[rstest]
#[tokio::test]
async fn misses_are_cached_briefly(clock: Arc<MutableClock>) {
    let mut origin = MockAssetOrigin::new();
    origin
        .expect_fetch()
        .times(2)
        .returning(|_| Err(AssetOriginError::not_found()));
    let cache = cache(origin, &clock, AssetCacheConfig::default());
    let missing = key("emote/missing/1x.webp");

    assert_eq!(cache.lookup(&missing).await.body, AssetBody::NotFound);
    assert_eq!(cache.lookup(&missing).await.body, AssetBody::NotFound);

    clock.advance(NOT_FOUND_MAX_AGE + Duration::from_secs(1));
    let refetched = cache.lookup(&missing).await;
    assert_eq!(refetched.record_delivery(), 0);
}

#[rstest]
#[tokio::test]
async fn origin_failures_are_never_stored(clock: Arc<MutableClock>) {
    let mut origin = MockAssetOrigin::new();
    origin
        .expect_fetch()
        .times(2)
        .returning(|_| Err(AssetOriginError::unavailable("503")));
    let cache = cache(origin, &clock, AssetCacheConfig::default());
    let emote = key("emote/flaky/1x.webp");

    let first = cache.lookup(&emote).await;
    assert_eq!(first.body, AssetBody::Unavailable);
    assert_eq!(first.cache_control(), "no-cache");
    cache.lookup(&emote).await;
    cache.run_pending_tasks().await;
    assert_eq!(cache.entry_count(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn slow_origins_time_out(clock: Arc<MutableClock>) {
    let origin = SlowOrigin {
        delay: Duration::from_secs(30),
        fetches: Arc::new(AtomicUsize::new(0)),
        panics: false,
    };
    let config = AssetCacheConfig {
        origin_timeout: Duration::from_secs(1),
        ..AssetCacheConfig::default()
    };
    let cache = cache(origin, &clock, config);

    let asset = cache.lookup(&key("emote/slow/1x.webp")).await;
    assert_eq!(asset.body, AssetBody::Unavailable);
}

#[rstest]
#[tokio::test]
async fn entries_expire_after_max_age(clock: Arc<MutableClock>) {
    let mut origin = MockAssetOrigin::new();
    origin
        .expect_fetch()
        .times(2)
        .returning(|_| Ok(webp(b"wave", Some("max-age=60"))));
    let cache = cache(origin, &clock, AssetCacheConfig::default());
    let emote = key("emote/wave/2x.webp");

    cache.lookup(&emote).await;
    clock.advance(Duration::from_secs(59));
    cache.lookup(&emote).await;
    clock.advance(Duration::from_secs(2));
    let refreshed = cache.lookup(&emote).await;
    assert_eq!(refreshed.age_secs(clock.utc()), 0);
}

#[rstest]
#[tokio::test]
async fn stored_bytes_stay_within_capacity(clock: Arc<MutableClock>) {
    let mut origin = MockAssetOrigin::new();
    origin
        .expect_fetch()
        .times(3)
        .returning(|_| Ok(webp(b"1234", None)));
    let config = AssetCacheConfig {
        capacity_bytes: 10,
        ..AssetCacheConfig::default()
    };
    let cache = cache(origin, &clock, config);

    for name in ["a.webp", "b.webp", "c.webp"] {
        cache.lookup(&key(name)).await;
    }
    cache.run_pending_tasks().await;

    assert!(cache.used_bytes() <= 10, "used {} bytes", cache.used_bytes());
    assert!(cache.entry_count() <= 2);
}

#[rstest]
#[tokio::test]
async fn zero_capacity_is_unbounded(clock: Arc<MutableClock>) {
    let mut origin = MockAssetOrigin::new();
    origin
        .expect_fetch()
        .returning(|_| Ok(webp(b"0123456789", None)));
    let config = AssetCacheConfig {
        capacity_bytes: 0,
        ..AssetCacheConfig::default()
    };
    let cache = cache(origin, &clock, config);

    for name in ["a.webp", "b.webp", "c.webp"] {
        cache.lookup(&key(name)).await;
    }
    cache.run_pending_tasks().await;
    assert_eq!(cache.used_bytes(), 30);
}

#[rstest]
#[tokio::test]
async fn purge_forces_a_refetch(clock: Arc<MutableClock>) {
    let mut origin = MockAssetOrigin::new();
    origin
        .expect_fetch()
        .times(2)
        .returning(|_| Ok(webp(b"wave", None)));
    let cache = cache(origin, &clock, AssetCacheConfig::default());
    let emote = key("emote/wave/3x.webp");

    cache.lookup(&emote).await;
    cache.purge(&emote).await;
    cache.run_pending_tasks().await;
    assert_eq!(cache.used_bytes(), 0);
    assert_eq!(cache.lookup(&emote).await.record_delivery(), 0);
}

/// Origin whose body can be swapped while a fetch is running.
struct VersionedOrigin {
    body: Arc<Mutex<&'static [u8]>>,
    delay: Duration,
}

#[async_trait]
impl AssetOrigin for VersionedOrigin {
    async fn fetch(&self, _key: &AssetKey) -> Result<OriginAsset, AssetOriginError> {
        let body = *lock(&self.body);
        tokio::time::sleep(self.delay).await;
        Ok(webp(body, None))
    }
}

fn bytes_of(asset: &CachedAsset) -> Option<&[u8]> {
    match &asset.body {
        AssetBody::Bytes { data, .. } => Some(data.as_ref()),
        AssetBody::NotFound | AssetBody::Unavailable => None,
    }
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn purge_during_a_fetch_discards_the_stale_body(clock: Arc<MutableClock>) {
    let body = Arc::new(Mutex::new(&b"v1"[..]));
    let origin = VersionedOrigin {
        body: Arc::clone(&body),
        delay: Duration::from_millis(100),
    };
    let cache = Arc::new(cache(origin, &clock, AssetCacheConfig::default()));
    let emote = key("emote/wave/4x.webp");

    let in_flight = tokio::spawn({
        let cache = Arc::clone(&cache);
        let emote = emote.clone();
        async move { cache.lookup(&emote).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    *lock(&body) = &b"v2"[..];
    cache.purge(&emote).await;

    let stale = in_flight.await.expect("lookup task");
    assert_eq!(bytes_of(&stale), Some(&b"v1"[..]));

    let fresh = cache.lookup(&emote).await;
    assert_eq!(bytes_of(&fresh), Some(&b"v2"[..]));
    assert_eq!(fresh.record_delivery(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn lookups_after_a_purge_do_not_follow_the_detached_fetch(clock: Arc<MutableClock>) {
    let fetches = Arc::new(AtomicUsize::new(0));
    let origin = SlowOrigin {
        delay: Duration::from_millis(100),
        fetches: Arc::clone(&fetches),
        panics: false,
    };
    let cache = Arc::new(cache(origin, &clock, AssetCacheConfig::default()));
    let emote = key("emote/slow/2x.webp");

    let detached = tokio::spawn({
        let cache = Arc::clone(&cache);
        let emote = emote.clone();
        async move { cache.lookup(&emote).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.purge(&emote).await;
    cache.lookup(&emote).await;
    detached.await.expect("lookup task");

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}
