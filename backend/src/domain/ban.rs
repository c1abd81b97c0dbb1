//! Moderator-issued user bans.
//!
//! A ban carries permission masks that are merged over the user's role
//! permissions while it is active, so a ban can revoke a single capability
//! (wearing paints, uploading emotes) or lock the account out entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::uuid_id;
use super::{Permissions, UserId};

/// Validation errors raised by ban constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserBanValidationError {
    #[error("ban id must not be empty")]
    EmptyId,
    #[error("ban id must be a valid UUID")]
    InvalidId,
    #[error("ban reason must not be empty")]
    EmptyReason,
    #[error("ban must expire after it was issued")]
    ExpiresBeforeCreation,
}

uuid_id!(
    /// Ban identifier.
    UserBanId,
    UserBanValidationError,
    UserBanValidationError::EmptyId,
    UserBanValidationError::InvalidId
);

/// A ban on one user. Permanent when `expires_at` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "UserBanDto")]
pub struct UserBan {
    pub id: UserBanId,
    pub user_id: UserId,
    pub created_by: Option<UserId>,
    pub reason: String,
    /// Overrides applied on top of the user's role permissions.
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserBan {
    /// Whether the ban applies at `now`; the expiry is exclusive.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.created_at <= now && self.expires_at.is_none_or(|expiry| now < expiry)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserBanDto {
    id: UserBanId,
    user_id: UserId,
    #[serde(default)]
    created_by: Option<UserId>,
    reason: String,
    #[serde(default)]
    permissions: Permissions,
    created_at: DateTime<Utc>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserBanDto> for UserBan {
    type Error = UserBanValidationError;

    fn try_from(value: UserBanDto) -> Result<Self, Self::Error> {
        if value.reason.trim().is_empty() {
            return Err(UserBanValidationError::EmptyReason);
        }
        if value.expires_at.is_some_and(|expiry| expiry <= value.created_at) {
            return Err(UserBanValidationError::ExpiresBeforeCreation);
        }
        Ok(Self {
            id: value.id,
            user_id: value.user_id,
            created_by: value.created_by,
            reason: value.reason,
            permissions: value.permissions,
            created_at: value.created_at,
            expires_at: value.expires_at,
        })
    }
}

/// The bans in force for one user at one instant, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBans(Vec<UserBan>);

impl ActiveBans {
    /// Keep the bans active at `now`; `None` when none are.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use emote_portal::domain::ActiveBans;
    ///
    /// assert!(ActiveBans::at(Vec::new(), Utc::now()).is_none());
    /// ```
    pub fn at(bans: impl IntoIterator<Item = UserBan>, now: DateTime<Utc>) -> Option<Self> {
        let mut active: Vec<UserBan> = bans
            .into_iter()
            .filter(|ban| ban.is_active(now))
            .collect();
        if active.is_empty() {
            return None;
        }
        active.sort_by_key(|ban| ban.created_at);
        Some(Self(active))
    }

    /// Overrides of every active ban, later bans applied over earlier ones.
    pub fn permissions(&self) -> Permissions {
        self.0.iter().fold(Permissions::default(), |mut acc, ban| {
            acc.merge(&ban.permissions);
            acc
        })
    }

    /// The active bans.
    pub fn bans(&self) -> &[UserBan] {
        &self.0
    }
}
