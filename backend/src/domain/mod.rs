//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities shared by the HTTP API, the
//! asset cache and the page loader. Types validate on construction and on
//! deserialisation, so adapters never see malformed identifiers or broken
//! invariants.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Emote, EmoteSet, Paint, Badge, Role, SpecialEvent: catalogue entities.
//! - UserBan: moderator-issued permission overrides.
//! - Permissions and entitlement calculation.
//! - FullUser and [`UserProfileService`]: resolved profiles.
//! - async_proxy: single-flight, key-superseding request wrappers.

pub mod asset;
pub mod async_proxy;
pub mod ban;
pub mod cosmetic;
pub mod emote;
pub mod emote_set;
pub mod entitlement;
pub mod error;
pub mod full_user;
pub mod permissions;
pub mod ports;
pub mod profile_service;
pub mod role;
pub mod special_event;
pub mod trace_id;
pub mod user;

pub use self::asset::{
    AssetBody, AssetKey, AssetKeyValidationError, CachedAsset, DEFAULT_MAX_AGE,
    NOT_FOUND_MAX_AGE, OriginAsset,
};
pub use self::ban::{ActiveBans, UserBan, UserBanId, UserBanValidationError};
pub use self::cosmetic::{
    Badge, BadgeId, CosmeticValidationError, EmoteSetId, GradientStop, Paint, PaintId,
    PaintLayer, PaintShadow, RadialShape,
};
pub use self::emote::{
    Emote, EmoteFlags, EmoteId, EmoteName, EmoteValidationError, ModerationState,
};
pub use self::emote_set::{
    EmoteSet, EmoteSetEmote, EmoteSetFlags, EmoteSetKind, EmoteSetValidationError,
};
pub use self::entitlement::{
    CalculatedEntitlements, Comparison, EntitlementCondition, EntitlementEdge,
    EntitlementEdgeKind, EntitlementFacts, EntitlementGraph, EntitlementManagedBy,
    EntitlementNode, EntitlementValidationError, Fact, Grant, ProductId,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::full_user::{FullUser, NO_ROLE_RANK};
pub use self::permissions::{
    AdminPermission, AllowDeny, EmotePermission, Permission, Permissions, RolePermission,
    UserPermission,
};
pub use self::profile_service::UserProfileService;
pub use self::role::{Role, RoleId, RoleValidationError};
pub use self::special_event::{SpecialEvent, SpecialEventId, SpecialEventValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{DisplayName, User, UserId, UserStyle, UserValidationError, Username};
