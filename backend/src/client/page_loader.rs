//! Keyed page loading over the [`PortalApi`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::client::route::{PageKind, Route};
use crate::domain::async_proxy::{AsyncProxy, KeyedProxy, ProxyState, Snapshot};
use crate::domain::ports::{EmoteSummary, PortalApi, SpecialEventSummary, UserSummary};
use crate::domain::{EmoteId, Error, SpecialEventId, UserId};

/// State of one page's request.
#[derive(Debug, Clone)]
pub enum PageState {
    User(ProxyState<UserSummary, Error>),
    Emote(ProxyState<EmoteSummary, Error>),
    SpecialEvent(ProxyState<SpecialEventSummary, Error>),
}

impl PageState {
    /// Which page this state belongs to.
    pub fn kind(&self) -> PageKind {
        match self {
            Self::User(_) => PageKind::User,
            Self::Emote(_) => PageKind::Emote,
            Self::SpecialEvent(_) => PageKind::SpecialEvent,
        }
    }

    /// Whether the request has not settled yet.
    pub fn is_pending(&self) -> bool {
        match self {
            Self::User(state) => state.is_pending(),
            Self::Emote(state) => state.is_pending(),
            Self::SpecialEvent(state) => state.is_pending(),
        }
    }

    /// Error the page request was rejected with, if it was.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::User(state) => state.error().map(AsRef::as_ref),
            Self::Emote(state) => state.error().map(AsRef::as_ref),
            Self::SpecialEvent(state) => state.error().map(AsRef::as_ref),
        }
    }
}

/// The request behind the page shown after a navigation.
#[derive(Debug, Clone)]
pub enum PageProxy {
    User(AsyncProxy<UserSummary, Error>),
    Emote(AsyncProxy<EmoteSummary, Error>),
    SpecialEvent(AsyncProxy<SpecialEventSummary, Error>),
}

impl PageProxy {
    /// Current state without waiting.
    pub fn state(&self) -> PageState {
        match self {
            Self::User(proxy) => PageState::User(proxy.state()),
            Self::Emote(proxy) => PageState::Emote(proxy.state()),
            Self::SpecialEvent(proxy) => PageState::SpecialEvent(proxy.state()),
        }
    }

    /// Wait for the request to settle and return the final state.
    ///
    /// A request aborted by a later navigation stays `Pending`.
    pub async fn settled(&self) -> PageState {
        match self {
            Self::User(proxy) => {
                let _outcome = proxy.wait().await;
                PageState::User(proxy.state())
            }
            Self::Emote(proxy) => {
                let _outcome = proxy.wait().await;
                PageState::Emote(proxy.state())
            }
            Self::SpecialEvent(proxy) => {
                let _outcome = proxy.wait().await;
                PageState::SpecialEvent(proxy.state())
            }
        }
    }
}

/// Loads page models, re-fetching only when a route parameter changes.
///
/// Each page kind keeps its own key, so bouncing between a user page and an
/// emote page reuses both requests.
pub struct PageLoader {
    api: Arc<dyn PortalApi>,
    users: KeyedProxy<UserId, UserSummary, Error>,
    emotes: KeyedProxy<EmoteId, EmoteSummary, Error>,
    special_events: KeyedProxy<SpecialEventId, SpecialEventSummary, Error>,
    current: Option<PageKind>,
}

impl PageLoader {
    /// Loader with no page shown yet.
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self {
            api,
            users: KeyedProxy::new(),
            emotes: KeyedProxy::new(),
            special_events: KeyedProxy::new(),
            current: None,
        }
    }

    /// Show `route`, starting its request unless the same entity is already
    /// loaded or loading.
    ///
    /// Must be called within a tokio runtime.
    pub fn navigate(&mut self, route: &Route) -> PageProxy {
        self.current = Some(route.kind());
        debug!(route = %route, "navigate");
        let api = Arc::clone(&self.api);
        match route {
            Route::User(id) => PageProxy::User(self.users.navigate(id.clone(), |id| {
                let id = id.clone();
                async move { api.user(&id).await }
            })),
            Route::Emote(id) => PageProxy::Emote(self.emotes.navigate(id.clone(), |id| {
                let id = id.clone();
                async move { api.emote(&id).await }
            })),
            Route::SpecialEvent(id) => {
                PageProxy::SpecialEvent(self.special_events.navigate(id.clone(), |id| {
                    let id = id.clone();
                    async move { api.special_event(&id).await }
                }))
            }
        }
    }

    /// Kind of the page last navigated to.
    pub fn current_kind(&self) -> Option<PageKind> {
        self.current
    }

    /// State of the page last navigated to; `None` before any navigation.
    pub fn state(&self) -> Option<PageState> {
        self.current.map(|kind| match kind {
            PageKind::User => PageState::User(self.users.state()),
            PageKind::Emote => PageState::Emote(self.emotes.state()),
            PageKind::SpecialEvent => PageState::SpecialEvent(self.special_events.state()),
        })
    }

    /// Stream of user page states across navigations.
    pub fn watch_users(&self) -> watch::Receiver<Snapshot<UserId, UserSummary, Error>> {
        self.users.subscribe()
    }

    /// Stream of emote page states across navigations.
    pub fn watch_emotes(&self) -> watch::Receiver<Snapshot<EmoteId, EmoteSummary, Error>> {
        self.emotes.subscribe()
    }

    /// Stream of special event page states across navigations.
    pub fn watch_special_events(
        &self,
    ) -> watch::Receiver<Snapshot<SpecialEventId, SpecialEventSummary, Error>> {
        self.special_events.subscribe()
    }
}

#[cfg(test)]
mod tests;
