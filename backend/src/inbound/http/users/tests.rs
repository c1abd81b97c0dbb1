//! Tests for user profile handlers.

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::Utc;
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::Value;

use super::*;
use crate::domain::ports::UserProfile;
use crate::domain::{
    CalculatedEntitlements, DisplayName, Emote, EmoteFlags, EmoteId, EmoteName, EmoteSet,
    EmoteSetFlags, EmoteSetId, EmoteSetKind, FullUser, User, UserStyle, Username,
};
use crate::inbound::http::test_utils::{MockPorts, fixed_now, header, read_json};

const ADA: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

fn ada() -> User {
    User {
        id: UserId::new(ADA).expect("valid id"),
        username: Username::new("ada").expect("valid username"),
        display_name: DisplayName::new("Ada").expect("valid display name"),
        style: UserStyle::default(),
        created_at: Utc::now(),
    }
}

async fn get(ports: MockPorts, uri: &str) -> actix_web::dev::ServiceResponse {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(ports.into_state()))
            .service(
                web::scope("/api/v1")
                    .service(get_user)
                    .service(get_user_entitlements)
                    .service(list_user_emotes)
                    .service(list_user_emote_sets),
            ),
    )
    .await;
    actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await
}

#[rstest]
#[actix_web::test]
async fn profile_is_returned_in_camel_case() {
    let mut ports = MockPorts::default();
    ports
        .profile
        .expect_fetch_profile()
        .with(eq(UserId::new(ADA).expect("valid id")), eq(fixed_now()))
        .times(1)
        .returning(|_, _| {
            Ok(UserProfile {
                user: FullUser::assemble(ada(), CalculatedEntitlements::default(), vec![], None),
                active_badge: None,
                active_paint: None,
                active_bans: vec![],
            })
        });

    let response = get(ports, &format!("/api/v1/users/{ADA}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "cache-control"),
        Some("private, no-cache, must-revalidate")
    );
    let body = read_json(response).await;
    assert_eq!(
        body.pointer("/user/displayName").and_then(Value::as_str),
        Some("Ada")
    );
    assert!(body.get("highestRoleRank").is_some());
    assert!(body.get("activeBadge").is_some_and(Value::is_null));
    assert_eq!(body.pointer("/banned").and_then(Value::as_bool), Some(false));
}

#[rstest]
#[case("/api/v1/users/not-a-uuid")]
#[case("/api/v1/users/not-a-uuid/entitlements")]
#[case("/api/v1/users/not-a-uuid/emotes")]
#[case("/api/v1/users/not-a-uuid/emote-sets")]
#[actix_web::test]
async fn malformed_ids_are_rejected_before_reaching_ports(#[case] uri: &str) {
    let response = get(MockPorts::default(), uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body.get("code").and_then(Value::as_str), Some("invalid_request"));
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("id")
    );
}

#[rstest]
#[actix_web::test]
async fn unknown_users_are_not_found() {
    let mut ports = MockPorts::default();
    ports
        .profile
        .expect_fetch_entitlements()
        .returning(|id| Err(Error::not_found(format!("user {id} not found"))));

    let response = get(ports, &format!("/api/v1/users/{ADA}/entitlements")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some(format!("user {ADA} not found").as_str())
    );
}

#[rstest]
#[actix_web::test]
async fn internal_failures_are_redacted() {
    let mut ports = MockPorts::default();
    ports
        .profile
        .expect_fetch_entitlements()
        .returning(|_| Err(Error::internal("connection reset by peer")));

    let response = get(ports, &format!("/api/v1/users/{ADA}/entitlements")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Internal server error")
    );
}

#[rstest]
#[actix_web::test]
async fn owned_emotes_are_listed() {
    let mut ports = MockPorts::default();
    ports.catalogue.expect_emotes_by_owner().returning(|owner| {
        Ok(vec![Emote {
            id: EmoteId::random(),
            name: EmoteName::new("catJAM").expect("valid name"),
            owner_id: owner.clone(),
            tags: vec!["cat".to_owned()],
            flags: EmoteFlags::ANIMATED | EmoteFlags::PUBLIC_LISTED,
            aspect_ratio: 1.0,
            created_at: Utc::now(),
        }])
    });

    let response = get(ports, &format!("/api/v1/users/{ADA}/emotes")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let emotes = body.as_array().expect("array body");
    assert_eq!(emotes.len(), 1);
    assert_eq!(
        emotes[0].get("ownerId").and_then(Value::as_str),
        Some(ADA)
    );
}

#[rstest]
#[actix_web::test]
async fn emote_sets_are_listed_for_existing_users() {
    let mut ports = MockPorts::default();
    ports
        .profile
        .expect_fetch_emote_sets()
        .times(1)
        .returning(|owner| {
            Ok(vec![EmoteSet {
                id: EmoteSetId::random(),
                name: "Channel".to_owned(),
                owner_id: Some(owner.clone()),
                kind: EmoteSetKind::Personal,
                tags: vec![],
                capacity: Some(300),
                flags: EmoteSetFlags::PUBLISHED,
                emotes: vec![],
                updated_at: Utc::now(),
            }])
        });

    let response = get(ports, &format!("/api/v1/users/{ADA}/emote-sets")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body.pointer("/0/ownerId").and_then(Value::as_str), Some(ADA));
    assert_eq!(body.pointer("/0/kind").and_then(Value::as_str), Some("personal"));
}
