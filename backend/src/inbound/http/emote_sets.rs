//! Emote set handlers.
//!
//! ```text
//! GET /api/v1/emote-sets/{id}
//! ```

use actix_web::{HttpResponse, get, web};

use crate::domain::EmoteSetId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::schemas::{EmoteSetSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Fetch one emote set with its emotes.
#[utoipa::path(
    get,
    path = "/api/v1/emote-sets/{id}",
    params(("id" = String, Path, description = "Emote set identifier (UUID)")),
    responses(
        (status = 200, description = "Emote set", body = EmoteSetSchema),
        (status = 400, description = "Invalid emote set id", body = ErrorSchema),
        (status = 404, description = "Unknown or private emote set", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["emote-sets"],
    operation_id = "getEmoteSet"
)]
#[get("/emote-sets/{id}")]
pub async fn get_emote_set(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: EmoteSetId = parse_id(path.as_str(), FieldName::new("id"))?;
    let set = state.catalogue.emote_set(&id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EmoteId, EmoteName, EmoteSet, EmoteSetEmote, EmoteSetFlags, EmoteSetKind, Error,
    };
    use crate::inbound::http::test_utils::{MockPorts, read_json};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::Utc;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::Value;

    async fn call(ports: MockPorts, uri: &str) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .service(web::scope("/api/v1").service(get_emote_set)),
        )
        .await;
        actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await
    }

    #[rstest]
    #[actix_web::test]
    async fn sets_are_served_with_their_aliases() {
        let id = EmoteSetId::random();
        let mut ports = MockPorts::default();
        ports
            .catalogue
            .expect_emote_set()
            .with(eq(id.clone()))
            .times(1)
            .returning(|requested| {
                Ok(EmoteSet {
                    id: requested.clone(),
                    name: "Global".to_owned(),
                    owner_id: None,
                    kind: EmoteSetKind::Global,
                    tags: vec![],
                    capacity: None,
                    flags: EmoteSetFlags::IMMUTABLE,
                    emotes: vec![EmoteSetEmote {
                        id: EmoteId::random(),
                        alias: EmoteName::new("Wave").expect("valid alias"),
                        added_at: Utc::now(),
                        added_by_id: None,
                    }],
                    updated_at: Utc::now(),
                })
            });

        let response = call(ports, &format!("/api/v1/emote-sets/{id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body.get("kind").and_then(Value::as_str), Some("global"));
        assert_eq!(
            body.pointer("/emotes/0/alias").and_then(Value::as_str),
            Some("Wave")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_sets_are_not_found() {
        let mut ports = MockPorts::default();
        ports
            .catalogue
            .expect_emote_set()
            .returning(|id| Err(Error::not_found(format!("emote set {id} not found"))));

        let response = call(ports, &format!("/api/v1/emote-sets/{}", EmoteSetId::random())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_set_ids_are_rejected() {
        let response = call(MockPorts::default(), "/api/v1/emote-sets/global").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
