//! Cache-control policies and cache header names shared by HTTP handlers.

use actix_web::http::header::{CACHE_CONTROL, HeaderName};

/// Private responses must always be revalidated before reuse.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Probe and purge responses must never be stored.
pub const NO_STORE: &str = "no-store";

/// Whether a CDN response came from the cache (`hit`) or the origin (`miss`).
pub const X_CACHE: &str = "x-cache";

/// How many times the cached CDN response was delivered before this one.
pub const X_CACHE_HITS: &str = "x-cache-hits";

/// Header tuple for private API responses.
pub fn private_no_cache_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}

/// Header tuple for responses that must not be stored.
pub fn no_store_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, NO_STORE)
}
