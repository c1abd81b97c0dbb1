//! Navigation reuses and supersedes page requests.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::client::render::{SOMETHING_WENT_WRONG, render};
use crate::domain::ModerationState;
use crate::domain::ports::MockPortalApi;

#[fixture]
fn user_id() -> UserId {
    UserId::random()
}

fn ada(id: &UserId) -> UserSummary {
    UserSummary {
        id: id.clone(),
        username: "ada".to_owned(),
        display_name: "Ada".to_owned(),
        roles: vec!["Subscriber".to_owned()],
        emote_count: 3,
    }
}

#[rstest]
#[tokio::test]
async fn revisiting_the_same_route_fetches_once(user_id: UserId) {
    let mut api = MockPortalApi::new();
    let summary = ada(&user_id);
    api.expect_user()
        .times(1)
        .returning(move |_| Ok(summary.clone()));
    let mut loader = PageLoader::new(Arc::new(api));
    let route = Route::User(user_id.clone());

    let first = loader.navigate(&route);
    let second = loader.navigate(&route);

    let PageState::User(state) = second.settled().await else {
        panic!("expected a user page");
    };
    assert_eq!(state.value().map(|user| user.username.as_str()), Some("ada"));
    assert!(!first.state().is_pending());
    assert_eq!(loader.current_kind(), Some(PageKind::User));
}

#[rstest]
#[tokio::test]
async fn a_new_id_supersedes_the_pending_request() {
    let stale_id = UserId::random();
    let fresh_id = UserId::random();
    let mut api = MockPortalApi::new();
    // The stale request is aborted before its first poll.
    api.expect_user()
        .with(eq(fresh_id.clone()))
        .times(1)
        .returning(|id| Ok(ada(id)));
    let mut loader = PageLoader::new(Arc::new(api));

    let stale = loader.navigate(&Route::User(stale_id));
    let fresh = loader.navigate(&Route::User(fresh_id.clone()));

    assert!(stale.settled().await.is_pending());
    let PageState::User(state) = fresh.settled().await else {
        panic!("expected a user page");
    };
    assert_eq!(state.value().map(|user| user.id.clone()), Some(fresh_id));
}

#[rstest]
#[tokio::test]
async fn page_kinds_keep_independent_requests(user_id: UserId) {
    let emote_id = EmoteId::random();
    let mut api = MockPortalApi::new();
    api.expect_user().times(1).returning(|id| Ok(ada(id)));
    api.expect_emote().times(1).returning(|id| {
        Ok(EmoteSummary {
            id: id.clone(),
            name: "PogChamp".to_owned(),
            owner_name: None,
            animated: false,
            moderation: ModerationState::Approved,
        })
    });
    let mut loader = PageLoader::new(Arc::new(api));

    loader.navigate(&Route::User(user_id.clone())).settled().await;
    loader.navigate(&Route::Emote(emote_id)).settled().await;
    let back = loader.navigate(&Route::User(user_id)).state();

    assert_eq!(back.kind(), PageKind::User);
    assert!(!back.is_pending());
    assert_eq!(loader.state().map(|state| state.kind()), Some(PageKind::User));
}

#[rstest]
#[tokio::test]
async fn failures_render_as_errors() {
    let mut api = MockPortalApi::new();
    api.expect_special_event()
        .returning(|_| Err(Error::service_unavailable("upstream down")));
    let mut loader = PageLoader::new(Arc::new(api));

    let page = loader
        .navigate(&Route::SpecialEvent(SpecialEventId::random()))
        .settled()
        .await;

    assert_eq!(page.error().map(Error::message), Some("upstream down"));
    assert_eq!(render(&page), SOMETHING_WENT_WRONG);
}

#[rstest]
#[tokio::test]
async fn subscribers_see_each_navigation() {
    let mut api = MockPortalApi::new();
    api.expect_special_event().returning(|id| {
        Ok(SpecialEventSummary {
            id: id.clone(),
            name: "Winter Fest".to_owned(),
            starts_at: Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).single().expect("valid"),
            ends_at: None,
            grant_count: 2,
        })
    });
    let mut loader = PageLoader::new(Arc::new(api));
    let mut events = loader.watch_special_events();

    loader
        .navigate(&Route::SpecialEvent(SpecialEventId::random()))
        .settled()
        .await;

    let snapshot = crate::domain::async_proxy::next_settled(&mut events)
        .await
        .expect("loader still alive");
    assert_eq!(snapshot.generation(), 1);
    assert!(snapshot.state.value().is_some());
}
