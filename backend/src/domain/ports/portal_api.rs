//! Port for the remote portal API consumed by the page loader.
//!
//! Page models carry only what a page shows; they are decoded from the
//! upstream API and never written back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EmoteId, Error, ModerationState, SpecialEventId, UserId};

/// User page model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub emote_count: u32,
}

/// Emote page model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmoteSummary {
    pub id: EmoteId,
    pub name: String,
    pub owner_name: Option<String>,
    #[serde(default)]
    pub animated: bool,
    pub moderation: ModerationState,
}

/// Special event page model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialEventSummary {
    pub id: SpecialEventId,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub grant_count: u32,
}

/// Remote API serving page models.
///
/// Unknown entities are reported as [`crate::domain::ErrorCode::NotFound`];
/// transport failures as [`crate::domain::ErrorCode::ServiceUnavailable`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Load the user page model.
    async fn user(&self, id: &UserId) -> Result<UserSummary, Error>;

    /// Load the emote page model.
    async fn emote(&self, id: &EmoteId) -> Result<EmoteSummary, Error>;

    /// Load the special event page model.
    async fn special_event(&self, id: &SpecialEventId) -> Result<SpecialEventSummary, Error>;
}
