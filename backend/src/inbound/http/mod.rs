//! HTTP inbound adapter exposing the portal REST API, the CDN and health
//! probes.

pub mod cache_control;
pub mod cdn;
pub mod emote_sets;
pub mod emotes;
pub mod error;
pub mod health;
pub mod schemas;
pub mod special_events;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
