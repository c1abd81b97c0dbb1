//! Emotes: user-uploaded images with metadata, flags and moderation state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use super::user::uuid_id;

/// Validation errors raised by emote constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmoteValidationError {
    #[error("emote id must not be empty")]
    EmptyId,
    #[error("emote id must be a valid UUID")]
    InvalidId,
    #[error("emote name must be between 1 and {max} characters")]
    NameLength { max: usize },
    #[error("emote name must not contain whitespace")]
    NameWhitespace,
}

uuid_id!(
    /// Emote identifier.
    EmoteId,
    EmoteValidationError,
    EmoteValidationError::EmptyId,
    EmoteValidationError::InvalidId
);

/// Maximum emote name length.
pub const EMOTE_NAME_MAX: usize = 100;

/// Name typed in chat to use the emote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmoteName(String);

impl EmoteName {
    /// Validate and construct an [`EmoteName`].
    pub fn new(value: impl Into<String>) -> Result<Self, EmoteValidationError> {
        let value = value.into();
        let length = value.chars().count();
        if length == 0 || length > EMOTE_NAME_MAX {
            return Err(EmoteValidationError::NameLength {
                max: EMOTE_NAME_MAX,
            });
        }
        if value.chars().any(char::is_whitespace) {
            return Err(EmoteValidationError::NameWhitespace);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for EmoteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<EmoteName> for String {
    fn from(value: EmoteName) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmoteName {
    type Error = EmoteValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

bitflags::bitflags! {
    /// Emote listing and rendering flags.
    ///
    /// Serialised in human-readable formats as `"PUBLIC_LISTED | ANIMATED"`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EmoteFlags: u32 {
        const PUBLIC_LISTED = 1 << 0;
        const PRIVATE = 1 << 1;
        const ZERO_WIDTH = 1 << 2;
        const ANIMATED = 1 << 3;
        const APPROVED_PERSONAL = 1 << 4;
        const DENIED_PERSONAL = 1 << 5;
        const NSFW = 1 << 6;
    }
}

/// Where an emote stands in the moderation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationState {
    Pending,
    Approved,
    Rejected,
}

impl ModerationState {
    /// Derive the state from the emote's flags.
    ///
    /// A denial wins over an approval; with neither flag set the emote is
    /// listed only if a moderator made it public, otherwise it awaits review.
    ///
    /// # Examples
    /// ```
    /// use emote_portal::domain::{EmoteFlags, ModerationState};
    ///
    /// let flags = EmoteFlags::APPROVED_PERSONAL | EmoteFlags::DENIED_PERSONAL;
    /// assert_eq!(ModerationState::from_flags(flags), ModerationState::Rejected);
    /// ```
    pub fn from_flags(flags: EmoteFlags) -> Self {
        if flags.contains(EmoteFlags::DENIED_PERSONAL) {
            Self::Rejected
        } else if flags.intersects(EmoteFlags::APPROVED_PERSONAL | EmoteFlags::PUBLIC_LISTED) {
            Self::Approved
        } else {
            Self::Pending
        }
    }
}

/// Uploaded emote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emote {
    pub id: EmoteId,
    pub name: EmoteName,
    pub owner_id: UserId,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub flags: EmoteFlags,
    pub aspect_ratio: f64,
    pub created_at: DateTime<Utc>,
}

impl Emote {
    /// Moderation state derived from [`Emote::flags`].
    pub fn moderation_state(&self) -> ModerationState {
        ModerationState::from_flags(self.flags)
    }

    /// Whether the emote shows up in public listings.
    pub fn is_listed(&self) -> bool {
        self.flags.contains(EmoteFlags::PUBLIC_LISTED) && !self.flags.contains(EmoteFlags::PRIVATE)
    }
}
