//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::test as actix_test;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::domain::ports::{MockAssetLookup, MockCatalogueQuery, MockUserProfileQuery};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::test_support::MutableClock;

/// Instant every handler test treats as "now".
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 24, 18, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Mocked ports, configured by each test before building the state.
#[derive(Default)]
pub struct MockPorts {
    pub profile: MockUserProfileQuery,
    pub catalogue: MockCatalogueQuery,
    pub assets: MockAssetLookup,
}

impl MockPorts {
    /// Wrap the mocks in [`HttpState`] with the clock pinned to
    /// [`fixed_now`].
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            profile: Arc::new(self.profile),
            catalogue: Arc::new(self.catalogue),
            assets: Arc::new(self.assets),
        })
        .with_clock(Arc::new(MutableClock::new(fixed_now())))
    }
}

/// Decode a JSON response body.
pub async fn read_json(response: ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

/// Read a response header as a string.
pub fn header<'a>(response: &'a ServiceResponse, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}
