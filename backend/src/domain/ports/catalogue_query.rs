//! Driving port for catalogue reads: emotes, emote sets and special events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    CalculatedEntitlements, Emote, EmoteId, EmoteSet, EmoteSetId, Error, SpecialEvent,
    SpecialEventId, UserId,
};

/// Special events relative to a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialEventListing {
    /// Running events, earliest start first.
    pub active: Vec<SpecialEvent>,
    /// Events that have not started, soonest first.
    pub upcoming: Vec<SpecialEvent>,
}

/// A special event with the entitlements it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialEventDetail {
    pub event: SpecialEvent,
    pub active: bool,
    pub grants: CalculatedEntitlements,
}

/// Domain use-case port for catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// Fetch one emote.
    async fn emote(&self, emote_id: &EmoteId) -> Result<Emote, Error>;

    /// Emotes owned by an existing user.
    async fn emotes_by_owner(&self, owner_id: &UserId) -> Result<Vec<Emote>, Error>;

    /// Fetch one emote set. Private sets read as not found.
    async fn emote_set(&self, set_id: &EmoteSetId) -> Result<EmoteSet, Error>;

    /// Active and upcoming events at `now`. Ended events are omitted.
    async fn special_events(&self, now: DateTime<Utc>) -> Result<SpecialEventListing, Error>;

    /// One event and its grants, with activity evaluated at `now`.
    async fn special_event(
        &self,
        event_id: &SpecialEventId,
        now: DateTime<Utc>,
    ) -> Result<SpecialEventDetail, Error>;
}
