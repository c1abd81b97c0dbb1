//! CDN asset keys and cached origin responses.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Lifetime of assets whose origin gives no caching hints.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 7);
/// Lifetime of cached misses.
pub const NOT_FOUND_MAX_AGE: Duration = Duration::from_secs(10);
/// Upper bound advertised to shared caches through `s-maxage`.
pub const SHARED_MAX_AGE_CAP: Duration = Duration::from_secs(60 * 60 * 24);
/// Longest accepted key.
pub const ASSET_KEY_MAX: usize = 512;

/// Validation errors raised when parsing an [`AssetKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetKeyValidationError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must be at most {max} bytes")]
    TooLong { max: usize },
    #[error("asset key must be a relative path without empty, `.` or `..` segments")]
    Traversal,
    #[error("asset key must not contain whitespace, control characters, `\\`, `:` or `%`")]
    InvalidCharacters,
}

/// Relative object path at the origin, for example `emote/0f3c/2x.webp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey(String);

impl AssetKey {
    /// Validate and construct an [`AssetKey`].
    ///
    /// # Examples
    /// ```
    /// use emote_portal::domain::AssetKey;
    ///
    /// assert!(AssetKey::new("emote/abc/1x.webp").is_ok());
    /// assert!(AssetKey::new("../secrets").is_err());
    /// assert!(AssetKey::new("http://elsewhere.example/x").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, AssetKeyValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(AssetKeyValidationError::Empty);
        }
        if value.len() > ASSET_KEY_MAX {
            return Err(AssetKeyValidationError::TooLong { max: ASSET_KEY_MAX });
        }
        // `:` would let a key read as a scheme and `%` smuggles encoded dots.
        if value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '\\' | ':' | '%'))
        {
            return Err(AssetKeyValidationError::InvalidCharacters);
        }
        if value
            .split('/')
            .any(|segment| matches!(segment, "" | "." | ".."))
        {
            return Err(AssetKeyValidationError::Traversal);
        }
        Ok(Self(value))
    }

    /// Borrow the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw object returned by an origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginAsset {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub expires: Option<String>,
}

impl OriginAsset {
    /// Lifetime advertised by the origin.
    ///
    /// `Cache-Control: max-age` wins, then an RFC 2822 `Expires` date in the
    /// future, then [`DEFAULT_MAX_AGE`].
    pub fn max_age(&self, now: DateTime<Utc>) -> Duration {
        self.cache_control
            .as_deref()
            .and_then(parse_max_age)
            .or_else(|| {
                self.expires
                    .as_deref()
                    .and_then(|raw| DateTime::parse_from_rfc2822(raw).ok())
                    .and_then(|expires| expires.signed_duration_since(now).to_std().ok())
            })
            .unwrap_or(DEFAULT_MAX_AGE)
    }
}

fn parse_max_age(cache_control: &str) -> Option<Duration> {
    cache_control.split(',').find_map(|directive| {
        let (name, value) = directive.trim().split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("max-age") {
            return None;
        }
        value.trim().parse::<u64>().ok().map(Duration::from_secs)
    })
}

/// Payload of a cached lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetBody {
    Bytes {
        content_type: Option<String>,
        data: Bytes,
    },
    NotFound,
    /// The origin failed or timed out.
    Unavailable,
}

/// Result of an asset lookup, shared between the cache and every request
/// that hits it.
#[derive(Debug, Clone)]
pub struct CachedAsset {
    pub body: AssetBody,
    pub fetched_at: DateTime<Utc>,
    pub max_age: Duration,
    hits: Arc<AtomicUsize>,
}

impl CachedAsset {
    /// Successful origin response.
    pub fn from_origin(origin: OriginAsset, now: DateTime<Utc>) -> Self {
        let max_age = origin.max_age(now);
        Self::with_body(
            AssetBody::Bytes {
                content_type: origin.content_type,
                data: origin.data,
            },
            now,
            max_age,
        )
    }

    /// Miss at the origin; cached briefly.
    pub fn not_found(now: DateTime<Utc>) -> Self {
        Self::with_body(AssetBody::NotFound, now, NOT_FOUND_MAX_AGE)
    }

    /// Origin failure; never cached.
    pub fn unavailable(now: DateTime<Utc>) -> Self {
        Self::with_body(AssetBody::Unavailable, now, Duration::ZERO)
    }

    fn with_body(body: AssetBody, fetched_at: DateTime<Utc>, max_age: Duration) -> Self {
        Self {
            body,
            fetched_at,
            max_age,
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Whether the response may be stored.
    pub fn is_cacheable(&self) -> bool {
        !self.max_age.is_zero()
    }

    /// Count a delivery and return how many deliveries preceded it.
    pub fn record_delivery(&self) -> usize {
        self.hits.fetch_add(1, Ordering::Relaxed)
    }

    /// Bytes held by the body.
    pub fn weight(&self) -> u64 {
        match &self.body {
            AssetBody::Bytes { data, .. } => u64::try_from(data.len()).unwrap_or(u64::MAX),
            AssetBody::NotFound | AssetBody::Unavailable => 0,
        }
    }

    /// Seconds since the origin response was fetched.
    pub fn age_secs(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.fetched_at).num_seconds()).unwrap_or(0)
    }

    /// Whether the entry outlived its `max_age` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let max_age = chrono::Duration::from_std(self.max_age).unwrap_or(chrono::Duration::MAX);
        self.fetched_at
            .checked_add_signed(max_age)
            .is_none_or(|expiry| expiry <= now)
    }

    /// `Cache-Control` value for delivering this response.
    pub fn cache_control(&self) -> String {
        if self.max_age.is_zero() {
            return "no-cache".to_owned();
        }
        let max_age = self.max_age.as_secs();
        let shared = max_age.min(SHARED_MAX_AGE_CAP.as_secs());
        format!("public, max-age={max_age}, s-maxage={shared}, immutable")
    }
}
