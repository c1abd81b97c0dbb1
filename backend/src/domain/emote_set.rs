//! Emote sets: named collections of emotes a channel or user enables.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EmoteId, EmoteName, EmoteSetId, UserId};

/// Validation errors raised by emote set constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmoteSetValidationError {
    #[error("emote set name must not be empty")]
    EmptyName,
    #[error("emote set holds {count} emotes but its capacity is {capacity}")]
    OverCapacity { count: usize, capacity: u32 },
    #[error("alias `{alias}` is used more than once in the set")]
    DuplicateAlias { alias: String },
}

/// What a set is for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmoteSetKind {
    #[default]
    Normal,
    /// Follows its owner into every channel.
    Personal,
    /// Available to everyone.
    Global,
    /// Granted through entitlements, for example by a special event.
    Special,
}

bitflags::bitflags! {
    /// Emote set flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EmoteSetFlags: u32 {
        const IMMUTABLE = 1 << 0;
        const PRIVILEGED = 1 << 1;
        const PRIVATE = 1 << 2;
        const PUBLISHED = 1 << 3;
    }
}

/// One emote enabled in a set under an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmoteSetEmote {
    pub id: EmoteId,
    pub alias: EmoteName,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub added_by_id: Option<UserId>,
}

/// Collection of emotes. Aliases are unique within a set and the emote count
/// never exceeds `capacity` when one is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "EmoteSetDto")]
pub struct EmoteSet {
    pub id: EmoteSetId,
    pub name: String,
    pub owner_id: Option<UserId>,
    pub kind: EmoteSetKind,
    pub tags: Vec<String>,
    pub capacity: Option<u32>,
    pub flags: EmoteSetFlags,
    pub emotes: Vec<EmoteSetEmote>,
    pub updated_at: DateTime<Utc>,
}

impl EmoteSet {
    /// Hidden from everyone but its owner and editors.
    pub fn is_private(&self) -> bool {
        self.flags.contains(EmoteSetFlags::PRIVATE)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmoteSetDto {
    id: EmoteSetId,
    name: String,
    #[serde(default)]
    owner_id: Option<UserId>,
    #[serde(default)]
    kind: EmoteSetKind,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    capacity: Option<u32>,
    #[serde(default)]
    flags: EmoteSetFlags,
    #[serde(default)]
    emotes: Vec<EmoteSetEmote>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmoteSetDto> for EmoteSet {
    type Error = EmoteSetValidationError;

    fn try_from(value: EmoteSetDto) -> Result<Self, Self::Error> {
        if value.name.trim().is_empty() {
            return Err(EmoteSetValidationError::EmptyName);
        }
        if let Some(capacity) = value.capacity {
            let count = value.emotes.len();
            if usize::try_from(capacity).is_ok_and(|capacity| count > capacity) {
                return Err(EmoteSetValidationError::OverCapacity { count, capacity });
            }
        }
        let mut aliases = HashSet::new();
        for emote in &value.emotes {
            if !aliases.insert(emote.alias.as_ref()) {
                return Err(EmoteSetValidationError::DuplicateAlias {
                    alias: emote.alias.as_ref().to_owned(),
                });
            }
        }
        Ok(Self {
            id: value.id,
            name: value.name,
            owner_id: value.owner_id,
            kind: value.kind,
            tags: value.tags,
            capacity: value.capacity,
            flags: value.flags,
            emotes: value.emotes,
            updated_at: value.updated_at,
        })
    }
}
