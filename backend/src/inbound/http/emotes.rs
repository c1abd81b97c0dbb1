//! Emote handlers.
//!
//! ```text
//! GET /api/v1/emotes/{id}
//! ```

use actix_web::{HttpResponse, get, web};

use crate::domain::EmoteId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::schemas::{EmoteSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Fetch one emote.
#[utoipa::path(
    get,
    path = "/api/v1/emotes/{id}",
    params(("id" = String, Path, description = "Emote identifier (UUID)")),
    responses(
        (status = 200, description = "Emote", body = EmoteSchema),
        (status = 400, description = "Invalid emote id", body = ErrorSchema),
        (status = 404, description = "Unknown emote", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["emotes"],
    operation_id = "getEmote"
)]
#[get("/emotes/{id}")]
pub async fn get_emote(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: EmoteId = parse_id(path.as_str(), FieldName::new("id"))?;
    let emote = state.catalogue.emote(&id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(emote))
}
