//! User profile handlers.
//!
//! ```text
//! GET /api/v1/users/{id}
//! GET /api/v1/users/{id}/entitlements
//! GET /api/v1/users/{id}/emotes
//! GET /api/v1/users/{id}/emote-sets
//! ```

use actix_web::{HttpResponse, get, web};

use crate::domain::{Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::schemas::{
    CalculatedEntitlementsSchema, EmoteSchema, EmoteSetSchema, ErrorSchema, UserProfileSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

const USER_ID: FieldName = FieldName::new("id");

fn user_id(path: &web::Path<String>) -> Result<UserId, Error> {
    parse_id(path.as_str(), USER_ID)
}

/// Fetch the resolved profile of a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "Resolved profile", body = UserProfileSchema),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserProfile"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    let profile = state.profile.fetch_profile(&id, state.clock.utc()).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(profile))
}

/// List everything the user is entitled to.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/entitlements",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (
            status = 200,
            description = "Calculated entitlements",
            body = CalculatedEntitlementsSchema
        ),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserEntitlements"
)]
#[get("/users/{id}/entitlements")]
pub async fn get_user_entitlements(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    let entitlements = state.profile.fetch_entitlements(&id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(entitlements))
}

/// List the emotes a user owns, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/emotes",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "Owned emotes", body = [EmoteSchema]),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUserEmotes"
)]
#[get("/users/{id}/emotes")]
pub async fn list_user_emotes(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    let emotes = state.catalogue.emotes_by_owner(&id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(emotes))
}

/// List the public emote sets a user owns or is granted, by name.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/emote-sets",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "Owned and granted emote sets", body = [EmoteSetSchema]),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUserEmoteSets"
)]
#[get("/users/{id}/emote-sets")]
pub async fn list_user_emote_sets(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    let sets = state.profile.fetch_emote_sets(&id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(sets))
}

#[cfg(test)]
mod tests;
