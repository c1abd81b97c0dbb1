//! The exported OpenAPI document references schema wrappers, not domain
//! internals, and serialises cleanly.

use emote_portal::ApiDoc;
use rstest::{fixture, rstest};
use serde_json::Value;
use utoipa::OpenApi;

#[fixture]
fn document() -> Value {
    let json = ApiDoc::openapi().to_json().expect("valid JSON");
    serde_json::from_str(&json).expect("document parses")
}

// utoipa replaces :: with . in schema names
#[rstest]
#[case("crate.domain.Error")]
#[case("crate.domain.ErrorCode")]
#[case("crate.domain.ports.UserProfile")]
#[case("crate.domain.CalculatedEntitlements")]
#[case("crate.domain.Emote")]
#[case("crate.domain.EmoteSet")]
#[case("crate.domain.ports.SpecialEventListing")]
#[case("crate.domain.ports.SpecialEventDetail")]
fn wrapper_schemas_are_registered(document: Value, #[case] name: &str) {
    let schemas = document
        .pointer("/components/schemas")
        .and_then(Value::as_object)
        .expect("schemas present");
    assert!(schemas.contains_key(name), "missing schema {name}");
}

#[rstest]
fn error_responses_reference_the_error_wrapper(document: Value) {
    let reference = document
        .pointer("/paths/~1api~1v1~1users~1{id}/get/responses/404/content/application~1json/schema/$ref")
        .and_then(Value::as_str);
    assert_eq!(reference, Some("#/components/schemas/crate.domain.Error"));
}

#[rstest]
fn purging_requires_the_bearer_scheme(document: Value) {
    let security = document
        .pointer("/paths/~1cdn~1{key}/delete/security/0/PurgeToken")
        .and_then(Value::as_array);
    assert_eq!(security.map(Vec::len), Some(0));
    assert_eq!(
        document
            .pointer("/components/securitySchemes/PurgeToken/scheme")
            .and_then(Value::as_str),
        Some("bearer")
    );
}
