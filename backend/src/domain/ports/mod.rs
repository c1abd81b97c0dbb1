//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the asset origin, the remote portal API)
//! expose typed errors so adapters map their failures into predictable
//! variants. Driving ports (queries, asset lookup) speak [`crate::domain::Error`].

mod macros;
pub(crate) use macros::define_port_error;

mod asset_lookup;
mod asset_origin;
mod catalogue_query;
mod catalogue_repository;
mod entitlement_repository;
mod portal_api;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use asset_lookup::MockAssetLookup;
pub use asset_lookup::AssetLookup;
#[cfg(test)]
pub use asset_origin::MockAssetOrigin;
pub use asset_origin::{AssetOrigin, AssetOriginError, FixtureAssetOrigin};
#[cfg(test)]
pub use catalogue_query::MockCatalogueQuery;
pub use catalogue_query::{CatalogueQuery, SpecialEventDetail, SpecialEventListing};
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{CatalogueRepository, CatalogueRepositoryError};
#[cfg(test)]
pub use entitlement_repository::MockEntitlementRepository;
pub use entitlement_repository::{EntitlementRepository, EntitlementRepositoryError};
#[cfg(test)]
pub use portal_api::MockPortalApi;
pub use portal_api::{EmoteSummary, PortalApi, SpecialEventSummary, UserSummary};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::{UserProfile, UserProfileQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
