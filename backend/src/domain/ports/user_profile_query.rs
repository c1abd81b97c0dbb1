//! Driving port for user profile queries.
//!
//! Inbound adapters use this port to load resolved profiles without
//! importing persistence details.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    Badge, CalculatedEntitlements, EmoteSet, Error, FullUser, Paint, UserBan, UserId,
};

/// Profile returned by `GET /api/v1/users/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: FullUser,
    /// Details of [`FullUser::active_badge_id`], when visible.
    pub active_badge: Option<Badge>,
    /// Details of [`FullUser::active_paint_id`], when visible.
    pub active_paint: Option<Paint>,
    /// Bans in force when the profile was resolved, oldest first.
    pub active_bans: Vec<UserBan>,
}

/// Domain use-case port for reading user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the resolved profile of `user_id`, with bans evaluated at
    /// `now`.
    async fn fetch_profile(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, Error>;

    /// Return what `user_id` is entitled to.
    async fn fetch_entitlements(&self, user_id: &UserId) -> Result<CalculatedEntitlements, Error>;

    /// Sets owned by or granted to `user_id`, private sets omitted.
    async fn fetch_emote_sets(&self, user_id: &UserId) -> Result<Vec<EmoteSet>, Error>;
}
