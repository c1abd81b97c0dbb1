//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **catalogue**: in-memory users, catalogue entities and entitlement
//!   edges loaded from a JSON seed
//! - **asset_origin**: reqwest-backed object store behind the CDN
//! - **asset_cache**: coalescing, capacity-bounded cache over an origin
//! - **graphql**: reqwest-backed client for the remote portal API
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. The asset cache is the exception: caching policy is
//! its whole job.

pub mod asset_cache;
pub mod asset_origin;
pub mod catalogue;
pub mod graphql;
