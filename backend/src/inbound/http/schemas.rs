//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their serialised shape for documentation only.
//! Deeply nested structures (permissions, paint layers, entitlement grants)
//! are documented as free-form objects.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// An upstream dependency is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "id must be a valid UUID")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "ada")]
    username: String,
    #[schema(example = "Ada")]
    display_name: String,
    /// Selected badge and paint, before visibility checks.
    #[schema(value_type = Object)]
    style: serde_json::Value,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::UserProfile`].
///
/// The resolved user: roles lowest rank first, merged permissions and the
/// cosmetics the user may currently wear.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::UserProfile, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserProfileSchema {
    user: UserSchema,
    #[schema(value_type = Vec<Object>)]
    roles: Vec<serde_json::Value>,
    #[schema(value_type = Object)]
    permissions: serde_json::Value,
    #[schema(example = 10)]
    highest_role_rank: i32,
    highest_role_color: Option<u32>,
    active_badge_id: Option<String>,
    active_paint_id: Option<String>,
    entitlements: CalculatedEntitlementsSchema,
    #[schema(value_type = Option<Object>)]
    active_badge: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    active_paint: Option<serde_json::Value>,
    /// Whether any ban was in force when the profile was resolved.
    banned: bool,
    /// Bans in force, oldest first. Each carries its permission overrides.
    #[schema(value_type = Vec<Object>)]
    active_bans: Vec<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::CalculatedEntitlements`].
///
/// Each entry is `{id, via, managedBy?}` where `via` names the node the
/// grant was reached from.
#[derive(ToSchema)]
#[schema(as = crate::domain::CalculatedEntitlements, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CalculatedEntitlementsSchema {
    #[schema(value_type = Vec<Object>)]
    roles: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    badges: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    paints: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    emote_sets: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    products: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    special_events: Vec<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Emote`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Emote, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EmoteSchema {
    #[schema(example = "0f3c9a2e-8d7b-4c61-a5e4-3b2f1d0c9e8a")]
    id: String,
    #[schema(example = "catJAM")]
    name: String,
    owner_id: String,
    tags: Vec<String>,
    /// Flag names joined by `|`.
    #[schema(example = "PUBLIC_LISTED | ANIMATED")]
    flags: String,
    #[schema(example = 1.0)]
    aspect_ratio: f64,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::EmoteSetEmote`].
#[derive(ToSchema)]
#[schema(as = crate::domain::EmoteSetEmote, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EmoteSetEmoteSchema {
    id: String,
    /// Name the emote is enabled under in this set.
    #[schema(example = "wave")]
    alias: String,
    added_at: String,
    added_by_id: Option<String>,
}

/// OpenAPI schema for [`crate::domain::EmoteSet`].
#[derive(ToSchema)]
#[schema(as = crate::domain::EmoteSet, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EmoteSetSchema {
    id: String,
    #[schema(example = "Channel emotes")]
    name: String,
    owner_id: Option<String>,
    /// One of `normal`, `personal`, `global` or `special`.
    #[schema(example = "normal")]
    kind: String,
    tags: Vec<String>,
    capacity: Option<u32>,
    /// Flag names joined by `|`.
    #[schema(example = "PUBLISHED")]
    flags: String,
    emotes: Vec<EmoteSetEmoteSchema>,
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::SpecialEvent`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SpecialEvent, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SpecialEventSchema {
    id: String,
    #[schema(example = "Winter Festival")]
    name: String,
    description: Option<String>,
    tags: Vec<String>,
    created_by: String,
    #[schema(example = "2024-12-20T00:00:00Z")]
    starts_at: String,
    /// Open-ended when absent.
    ends_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::ports::SpecialEventListing`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::SpecialEventListing)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SpecialEventListingSchema {
    /// Running events, earliest start first.
    active: Vec<SpecialEventSchema>,
    /// Events that have not started, soonest first.
    upcoming: Vec<SpecialEventSchema>,
}

/// OpenAPI schema for [`crate::domain::ports::SpecialEventDetail`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::SpecialEventDetail)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SpecialEventDetailSchema {
    event: SpecialEventSchema,
    /// Whether the event is running at the evaluated instant.
    active: bool,
    grants: CalculatedEntitlementsSchema,
}
