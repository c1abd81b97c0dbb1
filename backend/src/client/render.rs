//! Plain-text rendering of page states.

use crate::client::page_loader::PageState;
use crate::domain::async_proxy::ProxyState;
use crate::domain::ports::{EmoteSummary, SpecialEventSummary, UserSummary};
use crate::domain::{Error, ErrorCode, ModerationState};

/// Shown while a page request is in flight.
pub const LOADING: &str = "Loading…";

/// Shown for any failure other than a missing entity.
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";

fn user(summary: &UserSummary) -> String {
    let roles = if summary.roles.is_empty() {
        "no roles".to_owned()
    } else {
        summary.roles.join(", ")
    };
    format!(
        "{} (@{})\nRoles: {roles}\nEmotes: {}",
        summary.display_name, summary.username, summary.emote_count
    )
}

fn emote(summary: &EmoteSummary) -> String {
    let moderation = match summary.moderation {
        ModerationState::Pending => "pending review",
        ModerationState::Approved => "approved",
        ModerationState::Rejected => "rejected",
    };
    let kind = if summary.animated { "animated" } else { "static" };
    format!(
        "{}\nOwner: {}\n{kind}, {moderation}",
        summary.name,
        summary.owner_name.as_deref().unwrap_or("unknown")
    )
}

fn special_event(summary: &SpecialEventSummary) -> String {
    let ends = summary
        .ends_at
        .map_or_else(|| "open-ended".to_owned(), |ends| ends.to_rfc3339());
    format!(
        "{}\nStarts: {}\nEnds: {ends}\nGrants: {}",
        summary.name,
        summary.starts_at.to_rfc3339(),
        summary.grant_count
    )
}

fn failure(noun: &str, error: &Error) -> String {
    match error.code() {
        ErrorCode::NotFound => format!("{noun} not found"),
        _ => SOMETHING_WENT_WRONG.to_owned(),
    }
}

fn settle<T>(
    noun: &str,
    state: &ProxyState<T, Error>,
    summarise: impl FnOnce(&T) -> String,
) -> String {
    match state {
        ProxyState::Pending => LOADING.to_owned(),
        ProxyState::Ready(value) => summarise(value),
        ProxyState::Failed(error) => failure(noun, error),
    }
}

/// Text shown for a page in `state`.
///
/// # Examples
/// ```
/// use emote_portal::client::{LOADING, PageState, render};
/// use emote_portal::domain::async_proxy::ProxyState;
///
/// assert_eq!(render(&PageState::User(ProxyState::Pending)), LOADING);
/// ```
pub fn render(state: &PageState) -> String {
    let noun = state.kind().noun();
    match state {
        PageState::User(inner) => settle(noun, inner, user),
        PageState::Emote(inner) => settle(noun, inner, emote),
        PageState::SpecialEvent(inner) => settle(noun, inner, special_event),
    }
}
