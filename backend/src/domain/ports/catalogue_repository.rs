//! Read-side port for catalogue entities: emotes, emote sets, roles,
//! cosmetics and special events.

use async_trait::async_trait;

use crate::domain::{
    Badge, BadgeId, Emote, EmoteId, EmoteSet, EmoteSetId, Paint, PaintId, Role, RoleId,
    SpecialEvent, SpecialEventId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised when reading catalogue entities.
    pub enum CatalogueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalogue read connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "catalogue read query failed: {message}",
    }
}

/// Port for reading catalogue entities.
///
/// Lookups of unknown identifiers return `None` or omit the entry; they are
/// not errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// Fetch one emote.
    async fn emote(&self, id: &EmoteId) -> Result<Option<Emote>, CatalogueRepositoryError>;

    /// Emotes owned by `owner`, newest first.
    async fn emotes_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Emote>, CatalogueRepositoryError>;

    /// Fetch one emote set.
    async fn emote_set(
        &self,
        id: &EmoteSetId,
    ) -> Result<Option<EmoteSet>, CatalogueRepositoryError>;

    /// Emote sets with the given identifiers, in no particular order.
    async fn emote_sets(
        &self,
        ids: &[EmoteSetId],
    ) -> Result<Vec<EmoteSet>, CatalogueRepositoryError>;

    /// Emote sets owned by `owner`, in no particular order.
    async fn emote_sets_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<EmoteSet>, CatalogueRepositoryError>;

    /// Roles with the given identifiers, in no particular order.
    async fn roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, CatalogueRepositoryError>;

    /// Fetch one badge.
    async fn badge(&self, id: &BadgeId) -> Result<Option<Badge>, CatalogueRepositoryError>;

    /// Fetch one paint.
    async fn paint(&self, id: &PaintId) -> Result<Option<Paint>, CatalogueRepositoryError>;

    /// Every special event, ordered by start time.
    async fn special_events(&self) -> Result<Vec<SpecialEvent>, CatalogueRepositoryError>;

    /// Fetch one special event.
    async fn special_event(
        &self,
        id: &SpecialEventId,
    ) -> Result<Option<SpecialEvent>, CatalogueRepositoryError>;
}
