//! In-memory catalogue adapter.
//!
//! Serves users, catalogue entities and entitlement edges from a snapshot
//! loaded once at startup, typically from a JSON seed file. The snapshot is
//! immutable, so lookups never fail.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::{
    CatalogueRepository, CatalogueRepositoryError, EntitlementRepository,
    EntitlementRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Badge, BadgeId, Emote, EmoteId, EmoteSet, EmoteSetId, EntitlementEdge, EntitlementFacts,
    EntitlementGraph, EntitlementNode, Paint, PaintId, Role, RoleId, SpecialEvent, SpecialEventId,
    User, UserBan, UserId,
};

/// Errors raised while loading a catalogue seed.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read catalogue seed {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalogue seed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// User entry of a seed, with the purchase facts used by edge conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub facts: EntitlementFacts,
}

impl From<User> for SeedUser {
    fn from(user: User) -> Self {
        Self {
            user,
            facts: EntitlementFacts::default(),
        }
    }
}

/// Serialised catalogue snapshot.
///
/// Entities are validated while decoding, so a seed with a malformed id,
/// name or gradient is rejected as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogueSeed {
    pub users: Vec<SeedUser>,
    pub emotes: Vec<Emote>,
    pub emote_sets: Vec<EmoteSet>,
    pub roles: Vec<Role>,
    pub badges: Vec<Badge>,
    pub paints: Vec<Paint>,
    pub special_events: Vec<SpecialEvent>,
    pub edges: Vec<EntitlementEdge>,
    pub bans: Vec<UserBan>,
}

/// Catalogue held in memory; implements every repository port.
#[derive(Debug, Default)]
pub struct InMemoryCatalogue {
    users: HashMap<UserId, SeedUser>,
    emotes: HashMap<EmoteId, Emote>,
    emote_sets: HashMap<EmoteSetId, EmoteSet>,
    roles: HashMap<RoleId, Role>,
    badges: HashMap<BadgeId, Badge>,
    paints: HashMap<PaintId, Paint>,
    special_events: Vec<SpecialEvent>,
    graph: EntitlementGraph,
    bans: HashMap<UserId, Vec<UserBan>>,
}

impl InMemoryCatalogue {
    /// Decode a JSON seed.
    ///
    /// # Examples
    /// ```
    /// use emote_portal::outbound::catalogue::InMemoryCatalogue;
    ///
    /// let catalogue = InMemoryCatalogue::from_json(r#"{"users": [], "edges": []}"#)
    ///     .expect("empty seed decodes");
    /// # let _ = catalogue;
    /// ```
    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        let seed: CatalogueSeed = serde_json::from_str(raw)?;
        Ok(Self::from(seed))
    }

    /// Read and decode the JSON seed at `path`.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = read_seed(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalogue = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            users = catalogue.users.len(),
            emotes = catalogue.emotes.len(),
            emote_sets = catalogue.emote_sets.len(),
            events = catalogue.special_events.len(),
            "catalogue seed loaded"
        );
        Ok(catalogue)
    }
}

fn read_seed(path: &Path) -> std::io::Result<String> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "seed path must be a file")
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(Path::new(file_name))
}

impl From<CatalogueSeed> for InMemoryCatalogue {
    fn from(seed: CatalogueSeed) -> Self {
        let mut special_events = seed.special_events;
        special_events.sort_by_key(|event| event.starts_at);
        let mut bans: HashMap<UserId, Vec<UserBan>> = HashMap::new();
        for ban in seed.bans {
            bans.entry(ban.user_id.clone()).or_default().push(ban);
        }
        Self {
            users: seed
                .users
                .into_iter()
                .map(|entry| (entry.user.id.clone(), entry))
                .collect(),
            emotes: seed
                .emotes
                .into_iter()
                .map(|emote| (emote.id.clone(), emote))
                .collect(),
            emote_sets: seed
                .emote_sets
                .into_iter()
                .map(|set| (set.id.clone(), set))
                .collect(),
            roles: seed
                .roles
                .into_iter()
                .map(|role| (role.id.clone(), role))
                .collect(),
            badges: seed
                .badges
                .into_iter()
                .map(|badge| (badge.id.clone(), badge))
                .collect(),
            paints: seed
                .paints
                .into_iter()
                .map(|paint| (paint.id.clone(), paint))
                .collect(),
            special_events,
            graph: EntitlementGraph::new(seed.edges),
            bans,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryCatalogue {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.users.get(id).map(|entry| entry.user.clone()))
    }

    async fn entitlement_facts(
        &self,
        id: &UserId,
    ) -> Result<EntitlementFacts, UserRepositoryError> {
        Ok(self
            .users
            .get(id)
            .map(|entry| entry.facts.clone())
            .unwrap_or_default())
    }

    async fn bans(&self, id: &UserId) -> Result<Vec<UserBan>, UserRepositoryError> {
        Ok(self.bans.get(id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CatalogueRepository for InMemoryCatalogue {
    async fn emote(&self, id: &EmoteId) -> Result<Option<Emote>, CatalogueRepositoryError> {
        Ok(self.emotes.get(id).cloned())
    }

    async fn emotes_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Emote>, CatalogueRepositoryError> {
        let mut owned: Vec<Emote> = self
            .emotes
            .values()
            .filter(|emote| emote.owner_id == *owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn emote_set(
        &self,
        id: &EmoteSetId,
    ) -> Result<Option<EmoteSet>, CatalogueRepositoryError> {
        Ok(self.emote_sets.get(id).cloned())
    }

    async fn emote_sets(
        &self,
        ids: &[EmoteSetId],
    ) -> Result<Vec<EmoteSet>, CatalogueRepositoryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.emote_sets.get(id))
            .cloned()
            .collect())
    }

    async fn emote_sets_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<EmoteSet>, CatalogueRepositoryError> {
        Ok(self
            .emote_sets
            .values()
            .filter(|set| set.owner_id.as_ref() == Some(owner))
            .cloned()
            .collect())
    }

    async fn roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, CatalogueRepositoryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.roles.get(id))
            .cloned()
            .collect())
    }

    async fn badge(&self, id: &BadgeId) -> Result<Option<Badge>, CatalogueRepositoryError> {
        Ok(self.badges.get(id).cloned())
    }

    async fn paint(&self, id: &PaintId) -> Result<Option<Paint>, CatalogueRepositoryError> {
        Ok(self.paints.get(id).cloned())
    }

    async fn special_events(&self) -> Result<Vec<SpecialEvent>, CatalogueRepositoryError> {
        Ok(self.special_events.clone())
    }

    async fn special_event(
        &self,
        id: &SpecialEventId,
    ) -> Result<Option<SpecialEvent>, CatalogueRepositoryError> {
        Ok(self
            .special_events
            .iter()
            .find(|event| event.id == *id)
            .cloned())
    }
}

#[async_trait]
impl EntitlementRepository for InMemoryCatalogue {
    async fn graph_from(
        &self,
        _roots: &[EntitlementNode],
    ) -> Result<EntitlementGraph, EntitlementRepositoryError> {
        // The whole graph is already resident; traversal ignores the rest.
        Ok(self.graph.clone())
    }
}
