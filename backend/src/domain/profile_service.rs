//! Profile and catalogue service implementing the driving query ports.
//!
//! The service combines the user, catalogue and entitlement repositories:
//! profiles are resolved through [`FullUser::assemble`] after calculating the
//! user's entitlements, and special events are listed relative to a caller
//! supplied instant so handlers can inject a clock. Bans are evaluated the
//! same way.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, instrument};

use crate::domain::entitlement::{calculate, calculate_from};
use crate::domain::ports::{
    CatalogueQuery, CatalogueRepository, CatalogueRepositoryError, EntitlementRepository,
    EntitlementRepositoryError, SpecialEventDetail, SpecialEventListing, UserProfile,
    UserProfileQuery, UserRepository, UserRepositoryError,
};
use crate::domain::{
    ActiveBans, CalculatedEntitlements, Emote, EmoteId, EmoteSet, EmoteSetId, EntitlementFacts,
    EntitlementNode, Error, FullUser, RoleId, SpecialEventId, User, UserId,
};

/// Service answering profile and catalogue queries.
#[derive(Clone)]
pub struct UserProfileService<U, C, E> {
    users: Arc<U>,
    catalogue: Arc<C>,
    entitlements: Arc<E>,
}

impl<U, C, E> UserProfileService<U, C, E> {
    /// Create a service over the given repositories.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use emote_portal::domain::UserProfileService;
    /// # use emote_portal::outbound::catalogue::InMemoryCatalogue;
    /// let catalogue = Arc::new(InMemoryCatalogue::default());
    /// let service = UserProfileService::new(
    ///     Arc::clone(&catalogue),
    ///     Arc::clone(&catalogue),
    ///     catalogue,
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(users: Arc<U>, catalogue: Arc<C>, entitlements: Arc<E>) -> Self {
        Self {
            users,
            catalogue,
            entitlements,
        }
    }
}

fn map_user_error(err: UserRepositoryError) -> Error {
    error!(error = %err, "user repository failed");
    Error::internal("failed to load user")
}

fn map_catalogue_error(err: CatalogueRepositoryError) -> Error {
    error!(error = %err, "catalogue repository failed");
    Error::internal("failed to load catalogue")
}

fn map_entitlement_error(err: EntitlementRepositoryError) -> Error {
    error!(error = %err, "entitlement repository failed");
    Error::internal("failed to load entitlements")
}

impl<U, C, E> UserProfileService<U, C, E>
where
    U: UserRepository,
    C: CatalogueRepository,
    E: EntitlementRepository,
{
    async fn load_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }

    async fn entitlements_of(&self, user_id: &UserId) -> Result<CalculatedEntitlements, Error> {
        let facts = self
            .users
            .entitlement_facts(user_id)
            .await
            .map_err(map_user_error)?;
        let roots = [
            EntitlementNode::User(user_id.clone()),
            EntitlementNode::GlobalDefaultEntitlementGroup,
        ];
        let graph = self
            .entitlements
            .graph_from(&roots)
            .await
            .map_err(map_entitlement_error)?;
        Ok(calculate(user_id, &graph, &facts))
    }
}

#[async_trait]
impl<U, C, E> UserProfileQuery for UserProfileService<U, C, E>
where
    U: UserRepository,
    C: CatalogueRepository,
    E: EntitlementRepository,
{
    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn fetch_profile(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, Error> {
        let user = self.load_user(user_id).await?;
        let entitlements = self.entitlements_of(user_id).await?;
        let role_ids: Vec<RoleId> = entitlements.role_ids().cloned().collect();
        let roles = self
            .catalogue
            .roles(&role_ids)
            .await
            .map_err(map_catalogue_error)?;
        let bans = self.users.bans(user_id).await.map_err(map_user_error)?;
        let active = ActiveBans::at(bans, now);

        let full = FullUser::assemble(user, entitlements, roles, active.as_ref());

        let active_badge = match &full.active_badge_id {
            Some(id) => self.catalogue.badge(id).await.map_err(map_catalogue_error)?,
            None => None,
        };
        let active_paint = match &full.active_paint_id {
            Some(id) => self.catalogue.paint(id).await.map_err(map_catalogue_error)?,
            None => None,
        };

        Ok(UserProfile {
            user: full,
            active_badge,
            active_paint,
            active_bans: active.map(|bans| bans.bans().to_vec()).unwrap_or_default(),
        })
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn fetch_entitlements(&self, user_id: &UserId) -> Result<CalculatedEntitlements, Error> {
        self.load_user(user_id).await?;
        self.entitlements_of(user_id).await
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn fetch_emote_sets(&self, user_id: &UserId) -> Result<Vec<EmoteSet>, Error> {
        self.load_user(user_id).await?;
        let entitlements = self.entitlements_of(user_id).await?;
        let granted: Vec<EmoteSetId> = entitlements
            .emote_sets
            .iter()
            .map(|grant| grant.id.clone())
            .collect();

        let owned = self
            .catalogue
            .emote_sets_by_owner(user_id)
            .await
            .map_err(map_catalogue_error)?;
        let granted = self
            .catalogue
            .emote_sets(&granted)
            .await
            .map_err(map_catalogue_error)?;

        let unique: HashMap<EmoteSetId, EmoteSet> = owned
            .into_iter()
            .chain(granted)
            .filter(|set| !set.is_private())
            .map(|set| (set.id.clone(), set))
            .collect();
        let mut sets: Vec<EmoteSet> = unique.into_values().collect();
        sets.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.updated_at.cmp(&b.updated_at)));
        Ok(sets)
    }
}

#[async_trait]
impl<U, C, E> CatalogueQuery for UserProfileService<U, C, E>
where
    U: UserRepository,
    C: CatalogueRepository,
    E: EntitlementRepository,
{
    #[instrument(skip_all, fields(emote_id = %emote_id))]
    async fn emote(&self, emote_id: &EmoteId) -> Result<Emote, Error> {
        self.catalogue
            .emote(emote_id)
            .await
            .map_err(map_catalogue_error)?
            .ok_or_else(|| Error::not_found(format!("emote {emote_id} not found")))
    }

    #[instrument(skip_all, fields(owner_id = %owner_id))]
    async fn emotes_by_owner(&self, owner_id: &UserId) -> Result<Vec<Emote>, Error> {
        self.load_user(owner_id).await?;
        self.catalogue
            .emotes_by_owner(owner_id)
            .await
            .map_err(map_catalogue_error)
    }

    #[instrument(skip_all, fields(set_id = %set_id))]
    async fn emote_set(&self, set_id: &EmoteSetId) -> Result<EmoteSet, Error> {
        self.catalogue
            .emote_set(set_id)
            .await
            .map_err(map_catalogue_error)?
            .filter(|set| !set.is_private())
            .ok_or_else(|| Error::not_found(format!("emote set {set_id} not found")))
    }

    #[instrument(skip(self))]
    async fn special_events(&self, now: DateTime<Utc>) -> Result<SpecialEventListing, Error> {
        let mut events = self
            .catalogue
            .special_events()
            .await
            .map_err(map_catalogue_error)?;
        events.sort_by_key(|event| event.starts_at);

        let (active, rest): (Vec<_>, Vec<_>) =
            events.into_iter().partition(|event| event.is_active(now));
        let upcoming = rest
            .into_iter()
            .filter(|event| event.is_upcoming(now))
            .collect();
        Ok(SpecialEventListing { active, upcoming })
    }

    #[instrument(skip_all, fields(event_id = %event_id))]
    async fn special_event(
        &self,
        event_id: &SpecialEventId,
        now: DateTime<Utc>,
    ) -> Result<SpecialEventDetail, Error> {
        let event = self
            .catalogue
            .special_event(event_id)
            .await
            .map_err(map_catalogue_error)?
            .ok_or_else(|| Error::not_found(format!("special event {event_id} not found")))?;

        let roots = [EntitlementNode::SpecialEvent(event_id.clone())];
        let graph = self
            .entitlements
            .graph_from(&roots)
            .await
            .map_err(map_entitlement_error)?;
        // Event grants are listed as if for a user without purchases.
        let grants = calculate_from(roots, &graph, &EntitlementFacts::default());

        Ok(SpecialEventDetail {
            active: event.is_active(now),
            event,
            grants,
        })
    }
}
