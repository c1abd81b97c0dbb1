//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the portal, the schema
//! wrappers standing in for domain types, and the bearer scheme guarding
//! asset purges.
//!
//! The generated document is served by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{
    CalculatedEntitlementsSchema, EmoteSchema, EmoteSetEmoteSchema, EmoteSetSchema,
    ErrorCodeSchema, ErrorSchema, SpecialEventDetailSchema, SpecialEventListingSchema,
    SpecialEventSchema, UserProfileSchema, UserSchema,
};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the purge token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.description = Some("Token configured as `cdn_purge_token`.".to_owned());
        components.add_security_scheme("PurgeToken", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Emote portal API",
        description = "Read access to users, emotes, emote sets and special events."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::get_user_entitlements,
        crate::inbound::http::users::list_user_emotes,
        crate::inbound::http::users::list_user_emote_sets,
        crate::inbound::http::emotes::get_emote,
        crate::inbound::http::emote_sets::get_emote_set,
        crate::inbound::http::special_events::list_special_events,
        crate::inbound::http::special_events::get_special_event,
        crate::inbound::http::cdn::get_asset,
        crate::inbound::http::cdn::purge_asset,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSchema,
        UserProfileSchema,
        CalculatedEntitlementsSchema,
        EmoteSchema,
        EmoteSetSchema,
        EmoteSetEmoteSchema,
        SpecialEventSchema,
        SpecialEventListingSchema,
        SpecialEventDetailSchema,
    )),
    tags(
        (name = "users", description = "User profiles, entitlements, emotes and emote sets"),
        (name = "emotes", description = "Emote lookups"),
        (name = "emote-sets", description = "Emote set lookups"),
        (name = "special-events", description = "Time-boxed events and their grants"),
        (name = "cdn", description = "Cached origin assets"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/users/{id}")]
    #[case("/api/v1/users/{id}/entitlements")]
    #[case("/api/v1/users/{id}/emotes")]
    #[case("/api/v1/users/{id}/emote-sets")]
    #[case("/api/v1/emotes/{id}")]
    #[case("/api/v1/emote-sets/{id}")]
    #[case("/api/v1/special-events")]
    #[case("/api/v1/special-events/{id}")]
    #[case("/cdn/{key}")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn error_schema_uses_wire_field_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("crate.domain.Error").expect("Error schema");

        assert_object_schema_has_field(error, "code");
        assert_object_schema_has_field(error, "message");
        assert_object_schema_has_field(error, "traceId");
    }

    #[rstest]
    fn purge_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key("PurgeToken"));
    }
}
