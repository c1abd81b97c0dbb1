//! CDN handlers serving cached origin objects.
//!
//! ```text
//! GET    /cdn/{key}
//! DELETE /cdn/{key}   Authorization: Bearer <token>
//! ```
//!
//! Cacheable responses carry `Cache-Control`, `Age`, `x-cache` (`hit` or
//! `miss`) and `x-cache-hits`. Origin failures answer `503` with
//! `Cache-Control: no-cache` so no intermediary stores them.

use actix_web::http::StatusCode;
use actix_web::http::header::{AGE, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, delete, get, web};
use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use crate::domain::{AssetBody, AssetKey, CachedAsset, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::{X_CACHE, X_CACHE_HITS, no_store_header};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_asset_key};

const KEY: FieldName = FieldName::new("key");

fn status_for(body: &AssetBody) -> StatusCode {
    match body {
        AssetBody::Bytes { .. } => StatusCode::OK,
        AssetBody::NotFound => StatusCode::NOT_FOUND,
        AssetBody::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Attach cache headers and count the delivery.
fn insert_cache_headers(
    builder: &mut HttpResponseBuilder,
    asset: &CachedAsset,
    now: DateTime<Utc>,
) {
    builder.insert_header((CACHE_CONTROL, asset.cache_control()));
    if !asset.is_cacheable() {
        return;
    }
    let previous = asset.record_delivery();
    builder
        .insert_header((X_CACHE, if previous == 0 { "miss" } else { "hit" }))
        .insert_header((X_CACHE_HITS, previous.to_string()))
        .insert_header((AGE, asset.age_secs(now).to_string()));
}

/// Turn a lookup result into the client response.
pub(crate) fn asset_response(asset: CachedAsset, now: DateTime<Utc>) -> HttpResponse {
    let mut builder = HttpResponse::build(status_for(&asset.body));
    insert_cache_headers(&mut builder, &asset, now);
    match asset.body {
        AssetBody::Bytes { content_type, data } => {
            if let Some(content_type) = content_type {
                builder.insert_header((CONTENT_TYPE, content_type));
            }
            builder.body(data)
        }
        AssetBody::NotFound | AssetBody::Unavailable => builder.finish(),
    }
}

/// Serve an origin object through the cache.
#[utoipa::path(
    get,
    path = "/cdn/{key}",
    params(("key" = String, Path, description = "Object path at the origin, e.g. `emote/<id>/2x.webp`")),
    responses(
        (status = 200, description = "Object body", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid key", body = ErrorSchema),
        (status = 404, description = "No such object; cached briefly"),
        (status = 503, description = "Origin unavailable; not cached")
    ),
    tags = ["cdn"],
    operation_id = "getAsset",
    security([])
)]
#[get("/cdn/{key:.*}")]
pub async fn get_asset(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let key = parse_asset_key(path.as_str(), KEY)?;
    let asset = state.assets.lookup(&key).await;
    debug!(key = %key, status = status_for(&asset.body).as_u16(), "asset delivered");
    Ok(asset_response(asset, state.clock.utc()))
}

/// Credentials of an `Authorization: Bearer` header; the scheme name is
/// case-insensitive.
fn bearer_token(request: &HttpRequest) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(token.trim_start())
}

fn authorise_purge(state: &HttpState, request: &HttpRequest) -> Result<(), Error> {
    let Some(expected) = state.purge_token.as_deref() else {
        return Err(Error::forbidden("asset purging is disabled"));
    };
    match bearer_token(request) {
        Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => Ok(()),
        Some(_) => {
            warn!("asset purge rejected: wrong token");
            Err(Error::unauthorized("invalid purge token"))
        }
        None => Err(Error::unauthorized("missing bearer token")),
    }
}

/// Drop one key from the cache so the next request refetches it.
#[utoipa::path(
    delete,
    path = "/cdn/{key}",
    params(("key" = String, Path, description = "Object path to purge")),
    responses(
        (status = 204, description = "Entry purged"),
        (status = 400, description = "Invalid key", body = ErrorSchema),
        (status = 401, description = "Missing or wrong token", body = ErrorSchema),
        (status = 403, description = "Purging disabled", body = ErrorSchema)
    ),
    tags = ["cdn"],
    operation_id = "purgeAsset",
    security(("PurgeToken" = []))
)]
#[delete("/cdn/{key:.*}")]
pub async fn purge_asset(
    state: web::Data<HttpState>,
    request: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    authorise_purge(&state, &request)?;
    let key: AssetKey = parse_asset_key(path.as_str(), KEY)?;
    state.assets.purge(&key).await;
    info!(key = %key, "asset purged");
    Ok(HttpResponse::NoContent()
        .insert_header(no_store_header())
        .finish())
}
