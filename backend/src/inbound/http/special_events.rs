//! Special event handlers.
//!
//! ```text
//! GET /api/v1/special-events?at=2024-12-24T18:00:00Z
//! GET /api/v1/special-events/{id}?at=2024-12-24T18:00:00Z
//! ```
//!
//! `at` defaults to the server clock and lets clients preview which events
//! run at another instant.

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Error, SpecialEventId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::schemas::{
    ErrorSchema, SpecialEventDetailSchema, SpecialEventListingSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_rfc3339_timestamp};

/// Query string shared by the special event endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AtQuery {
    pub at: Option<String>,
}

fn evaluation_instant(state: &HttpState, query: AtQuery) -> Result<DateTime<Utc>, Error> {
    let at = parse_optional_rfc3339_timestamp(query.at.as_deref(), FieldName::new("at"))?;
    Ok(at.unwrap_or_else(|| state.clock.utc()))
}

/// List running and upcoming special events.
#[utoipa::path(
    get,
    path = "/api/v1/special-events",
    params(
        ("at" = Option<String>, Query, description = "RFC 3339 instant to evaluate, defaults to now")
    ),
    responses(
        (
            status = 200,
            description = "Active and upcoming events",
            body = SpecialEventListingSchema
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["special-events"],
    operation_id = "listSpecialEvents"
)]
#[get("/special-events")]
pub async fn list_special_events(
    state: web::Data<HttpState>,
    query: web::Query<AtQuery>,
) -> ApiResult<HttpResponse> {
    let now = evaluation_instant(&state, query.into_inner())?;
    let listing = state.catalogue.special_events(now).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(listing))
}

/// Fetch one special event and the entitlements it grants.
#[utoipa::path(
    get,
    path = "/api/v1/special-events/{id}",
    params(
        ("id" = String, Path, description = "Special event identifier (UUID)"),
        ("at" = Option<String>, Query, description = "RFC 3339 instant to evaluate, defaults to now")
    ),
    responses(
        (status = 200, description = "Event and grants", body = SpecialEventDetailSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown event", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["special-events"],
    operation_id = "getSpecialEvent"
)]
#[get("/special-events/{id}")]
pub async fn get_special_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<AtQuery>,
) -> ApiResult<HttpResponse> {
    let id: SpecialEventId = parse_id(path.as_str(), FieldName::new("id"))?;
    let now = evaluation_instant(&state, query.into_inner())?;
    let detail = state.catalogue.special_event(&id, now).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(detail))
}
