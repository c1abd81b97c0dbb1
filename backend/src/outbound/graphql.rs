//! Reqwest-backed GraphQL client for the remote portal API.
//!
//! Posts `{query, variables}` and decodes the `{data, errors}` envelope:
//! transport failures and upstream 5xx answers become
//! [`ErrorCode::ServiceUnavailable`], a `null` entity becomes
//! [`ErrorCode::NotFound`] and GraphQL errors become
//! [`ErrorCode::InternalError`] carrying the first message.
//!
//! [`ErrorCode::ServiceUnavailable`]: crate::domain::ErrorCode::ServiceUnavailable
//! [`ErrorCode::NotFound`]: crate::domain::ErrorCode::NotFound
//! [`ErrorCode::InternalError`]: crate::domain::ErrorCode::InternalError

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::domain::ports::{EmoteSummary, PortalApi, SpecialEventSummary, UserSummary};
use crate::domain::{EmoteId, Error, SpecialEventId, UserId};

const USER_QUERY: &str = "query User($id: ID!) {
  user(id: $id) { id username displayName roles emoteCount }
}";

const EMOTE_QUERY: &str = "query Emote($id: ID!) {
  emote(id: $id) { id name ownerName animated moderation }
}";

const SPECIAL_EVENT_QUERY: &str = "query SpecialEvent($id: ID!) {
  specialEvent(id: $id) { id name startsAt endsAt grantCount }
}";

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

/// Entity requested by one query, used for lookups and messages.
#[derive(Debug, Clone, Copy)]
struct Selection<'a> {
    field: &'static str,
    kind: &'static str,
    id: &'a str,
}

/// GraphQL client posting to a single endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    client: Client,
    endpoint: Url,
}

impl GraphqlClient {
    /// Build a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    #[instrument(skip_all, fields(field = selection.field, id = selection.id))]
    async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        selection: Selection<'_>,
    ) -> Result<T, Error> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "query": query, "variables": { "id": selection.id } }))
            .send()
            .await
            .map_err(|err| unreachable_error(&err))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| unreachable_error(&err))?;
        if let Some(err) = status_error(status) {
            return Err(err);
        }
        debug!(bytes = body.len(), "portal API answered");
        interpret(&body, selection)
    }
}

fn unreachable_error(err: &reqwest::Error) -> Error {
    warn!(error = %err, "portal API request failed");
    Error::service_unavailable("portal API is unreachable")
}

fn status_error(status: StatusCode) -> Option<Error> {
    if status.is_success() {
        return None;
    }
    warn!(status = status.as_u16(), "portal API returned an error status");
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Some(Error::service_unavailable(format!(
            "portal API answered {}",
            status.as_u16()
        )))
    } else {
        Some(Error::internal(format!(
            "portal API rejected the request with {}",
            status.as_u16()
        )))
    }
}

fn interpret<T: DeserializeOwned>(body: &[u8], selection: Selection<'_>) -> Result<T, Error> {
    let envelope: GraphqlResponse = serde_json::from_slice(body)
        .map_err(|err| Error::internal(format!("invalid GraphQL response: {err}")))?;

    if let Some(first) = envelope.errors.into_iter().next() {
        return Err(Error::internal(first.message));
    }

    let entity = envelope
        .data
        .as_ref()
        .and_then(|data| data.get(selection.field))
        .filter(|value| !value.is_null())
        .ok_or_else(|| Error::not_found(format!("{} {} not found", selection.kind, selection.id)))?;

    T::deserialize(entity).map_err(|err| {
        Error::internal(format!("invalid {} payload: {err}", selection.kind))
    })
}

#[async_trait]
impl PortalApi for GraphqlClient {
    async fn user(&self, id: &UserId) -> Result<UserSummary, Error> {
        let id = id.to_string();
        self.fetch(
            USER_QUERY,
            Selection {
                field: "user",
                kind: "user",
                id: &id,
            },
        )
        .await
    }

    async fn emote(&self, id: &EmoteId) -> Result<EmoteSummary, Error> {
        let id = id.to_string();
        self.fetch(
            EMOTE_QUERY,
            Selection {
                field: "emote",
                kind: "emote",
                id: &id,
            },
        )
        .await
    }

    async fn special_event(&self, id: &SpecialEventId) -> Result<SpecialEventSummary, Error> {
        let id = id.to_string();
        self.fetch(
            SPECIAL_EVENT_QUERY,
            Selection {
                field: "specialEvent",
                kind: "special event",
                id: &id,
            },
        )
        .await
    }
}
