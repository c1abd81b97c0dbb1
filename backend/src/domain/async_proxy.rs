//! Streamed async proxies: pending requests exposed as observable values.
//!
//! [`AsyncProxy`] wraps one in-flight request. The request is driven on its
//! own task exactly once; any number of consumers may await it with
//! [`AsyncProxy::wait`] or watch it move from [`ProxyState::Pending`] to
//! [`ProxyState::Ready`] / [`ProxyState::Failed`] through
//! [`AsyncProxy::subscribe`].
//!
//! [`KeyedProxy`] ties a proxy to an identity key (a route parameter, an
//! entity id). Navigating with the key already in place reuses the existing
//! proxy, so no redundant request is issued. Navigating with a new key aborts
//! the stale request and starts a new one. Outcomes flow into a keyed stream
//! that never carries a superseded result.
//!
//! ```
//! use emote_portal::domain::async_proxy::{KeyedProxy, ProxyState};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut profile: KeyedProxy<u32, String, String> = KeyedProxy::new();
//! let first = profile.navigate(7, |id| {
//!     let id = *id;
//!     async move { Ok(format!("user {id}")) }
//! });
//! // Same key: the fetch closure is not invoked again.
//! let again = profile.navigate(7, |_| async { Err("unexpected refetch".to_owned()) });
//! assert_eq!(*again.wait().await.expect("resolved"), "user 7");
//! assert!(matches!(first.state(), ProxyState::Ready(_)));
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::watch;
use tracing::debug;

/// Observable state of a proxied request.
#[derive(Debug)]
pub enum ProxyState<T, E> {
    /// The request has not settled yet.
    Pending,
    /// The request resolved.
    Ready(Arc<T>),
    /// The request was rejected.
    Failed(Arc<E>),
}

impl<T, E> Clone for ProxyState<T, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Ready(value) => Self::Ready(Arc::clone(value)),
            Self::Failed(error) => Self::Failed(Arc::clone(error)),
        }
    }
}

impl<T, E> ProxyState<T, E> {
    /// Whether the request is still in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Resolved value, if any.
    pub fn value(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Rejection, if any.
    pub fn error(&self) -> Option<&Arc<E>> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    fn settle(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready(Arc::new(value)),
            Err(error) => Self::Failed(Arc::new(error)),
        }
    }
}

/// Failure observed by a consumer awaiting a proxy.
#[derive(Debug)]
pub enum ProxyError<E> {
    /// The request settled with a rejection.
    Rejected(Arc<E>),
    /// The request was aborted before settling (superseded or panicked).
    Cancelled,
    /// No request has been started yet.
    Idle,
}

impl<E> Clone for ProxyError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Rejected(error) => Self::Rejected(Arc::clone(error)),
            Self::Cancelled => Self::Cancelled,
            Self::Idle => Self::Idle,
        }
    }
}

impl<E: fmt::Display> fmt::Display for ProxyError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(error) => write!(f, "request rejected: {error}"),
            Self::Cancelled => f.write_str("request cancelled before it settled"),
            Self::Idle => f.write_str("no request has been started"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ProxyError<E> {}

type SettleHook<T, E> = Box<dyn FnOnce(Option<&ProxyState<T, E>>) + Send>;

/// Runs the settle hook exactly once: with the outcome, or with `None` when
/// the request future is dropped unsettled.
struct SettleGuard<T, E> {
    hook: Option<SettleHook<T, E>>,
}

impl<T, E> SettleGuard<T, E> {
    fn settle(mut self, state: &ProxyState<T, E>) {
        if let Some(hook) = self.hook.take() {
            hook(Some(state));
        }
    }
}

impl<T, E> Drop for SettleGuard<T, E> {
    fn drop(&mut self) {
        // Reached on abort and while unwinding from a panicking request.
        if let Some(hook) = self.hook.take() {
            hook(None);
        }
    }
}

struct Inner<T, E> {
    receiver: watch::Receiver<ProxyState<T, E>>,
    abort: AbortHandle,
}

impl<T, E> Drop for Inner<T, E> {
    fn drop(&mut self) {
        // Last handle gone: nobody can observe the outcome any more.
        self.abort.abort();
    }
}

/// Handle to a single proxied request. Cloning shares the request.
pub struct AsyncProxy<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for AsyncProxy<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for AsyncProxy<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.inner.receiver.borrow() {
            ProxyState::Pending => "pending",
            ProxyState::Ready(_) => "ready",
            ProxyState::Failed(_) => "failed",
        };
        f.debug_struct("AsyncProxy").field("state", &state).finish()
    }
}

impl<T, E> AsyncProxy<T, E> {
    /// Snapshot of the current state.
    pub fn state(&self) -> ProxyState<T, E> {
        self.inner.receiver.borrow().clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ProxyState<T, E>> {
        self.inner.receiver.clone()
    }

    /// Abort the request if it is still pending. Waiters observe
    /// [`ProxyError::Cancelled`].
    pub fn cancel(&self) {
        self.inner.abort.abort();
    }

    /// Await the eventual value, or the propagated rejection.
    pub async fn wait(&self) -> Result<Arc<T>, ProxyError<E>> {
        let mut receiver = self.subscribe();
        loop {
            let state = receiver.borrow_and_update().clone();
            match state {
                ProxyState::Ready(value) => return Ok(value),
                ProxyState::Failed(error) => return Err(ProxyError::Rejected(error)),
                ProxyState::Pending => {}
            }
            if receiver.changed().await.is_err() {
                // The driving task is gone; report whatever it left behind.
                let last = receiver.borrow().clone();
                return match last {
                    ProxyState::Ready(value) => Ok(value),
                    ProxyState::Failed(error) => Err(ProxyError::Rejected(error)),
                    ProxyState::Pending => Err(ProxyError::Cancelled),
                };
            }
        }
    }

    fn settled(state: ProxyState<T, E>) -> Self {
        let (_sender, receiver) = watch::channel(state);
        let (abort, _registration) = AbortHandle::new_pair();
        Self {
            inner: Arc::new(Inner { receiver, abort }),
        }
    }

    /// Proxy that is already resolved.
    pub fn ready(value: T) -> Self {
        Self::settled(ProxyState::Ready(Arc::new(value)))
    }

    /// Proxy that is already rejected.
    pub fn failed(error: E) -> Self {
        Self::settled(ProxyState::Failed(Arc::new(error)))
    }
}

impl<T, E> AsyncProxy<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Start driving `request` on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new<F>(request: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::spawn(request, None)
    }

    /// Start driving `request`, invoking `hook` once it ends.
    ///
    /// The hook receives the settled state, or `None` when the request was
    /// aborted or panicked before settling.
    pub fn with_settle_hook<F, H>(request: F, hook: H) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        H: FnOnce(Option<&ProxyState<T, E>>) + Send + 'static,
    {
        Self::spawn(request, Some(Box::new(hook)))
    }

    fn spawn<F>(request: F, hook: Option<SettleHook<T, E>>) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (sender, receiver) = watch::channel(ProxyState::Pending);
        let (abort, registration) = AbortHandle::new_pair();
        // Built outside the future so an abort before the first poll still
        // drops it.
        let guard = SettleGuard { hook };
        let task = Abortable::new(
            async move {
                let settled = ProxyState::settle(request.await);
                sender.send_replace(settled.clone());
                guard.settle(&settled);
            },
            registration,
        );
        tokio::spawn(task);
        Self {
            inner: Arc::new(Inner { receiver, abort }),
        }
    }
}

/// Entry published on a [`KeyedProxy`] stream.
#[derive(Debug)]
pub struct Snapshot<K, T, E> {
    /// Key the state belongs to; `None` before the first navigation.
    pub key: Option<K>,
    /// State of the request for `key`.
    pub state: ProxyState<T, E>,
    generation: u64,
    abandoned: bool,
}

impl<K: Clone, T, E> Clone for Snapshot<K, T, E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            state: self.state.clone(),
            generation: self.generation,
            abandoned: self.abandoned,
        }
    }
}

impl<K, T, E> Snapshot<K, T, E> {
    /// Number of key changes seen so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a key is in place and its request has settled.
    pub fn is_settled(&self) -> bool {
        self.key.is_some() && !self.state.is_pending()
    }

    /// Whether the request for the current key ended without settling,
    /// because it panicked or was cancelled. The state stays `Pending`.
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }
}

/// Wait until the stream carries a settled or abandoned snapshot.
///
/// Returns `None` once the owning [`KeyedProxy`] is dropped.
pub async fn next_settled<K: Clone, T, E>(
    receiver: &mut watch::Receiver<Snapshot<K, T, E>>,
) -> Option<Snapshot<K, T, E>> {
    loop {
        let snapshot = receiver.borrow_and_update().clone();
        if snapshot.is_settled() || snapshot.is_abandoned() {
            return Some(snapshot);
        }
        receiver.changed().await.ok()?;
    }
}

/// A proxy that re-resolves whenever its identity key changes.
pub struct KeyedProxy<K, T, E> {
    current: Option<(K, AsyncProxy<T, E>)>,
    stream: Arc<watch::Sender<Snapshot<K, T, E>>>,
}

impl<K, T, E> Default for KeyedProxy<K, T, E> {
    fn default() -> Self {
        let (sender, _receiver) = watch::channel(Snapshot {
            key: None,
            state: ProxyState::Pending,
            generation: 0,
            abandoned: false,
        });
        Self {
            current: None,
            stream: Arc::new(sender),
        }
    }
}

impl<K, T, E> KeyedProxy<K, T, E> {
    /// Create a proxy with no key in place.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key currently in place.
    pub fn key(&self) -> Option<&K> {
        self.current.as_ref().map(|(key, _)| key)
    }

    /// Proxy for the current key.
    pub fn current(&self) -> Option<&AsyncProxy<T, E>> {
        self.current.as_ref().map(|(_, proxy)| proxy)
    }

    /// State of the current request; `Pending` before the first navigation.
    pub fn state(&self) -> ProxyState<T, E> {
        self.current()
            .map_or(ProxyState::Pending, AsyncProxy::state)
    }

    /// Receiver that follows the keyed stream across navigations.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<K, T, E>> {
        self.stream.subscribe()
    }

    /// Await the request for the current key.
    pub async fn wait(&self) -> Result<Arc<T>, ProxyError<E>> {
        let proxy = self.current().cloned();
        match proxy {
            Some(proxy) => proxy.wait().await,
            None => Err(ProxyError::Idle),
        }
    }
}

impl<K, T, E> KeyedProxy<K, T, E>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Point the proxy at `key`.
    ///
    /// With the key already in place the existing proxy is returned and
    /// `fetch` is not called, whatever that request's outcome was. Otherwise
    /// the stale request is aborted and `fetch(&key)` is started.
    ///
    /// # Panics
    ///
    /// Panics when a new request must be started outside a tokio runtime.
    pub fn navigate<F, Fut>(&mut self, key: K, fetch: F) -> AsyncProxy<T, E>
    where
        F: FnOnce(&K) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if let Some((current_key, proxy)) = &self.current {
            if *current_key == key {
                return proxy.clone();
            }
        }

        if let Some((_, stale)) = self.current.take() {
            stale.cancel();
        }

        let mut generation = 0;
        self.stream.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.key = Some(key.clone());
            snapshot.state = ProxyState::Pending;
            snapshot.abandoned = false;
            generation = snapshot.generation;
        });
        debug!(generation, "key changed, starting request");

        let stream = Arc::clone(&self.stream);
        let proxy = AsyncProxy::with_settle_hook(fetch(&key), move |settled| {
            stream.send_if_modified(|snapshot| {
                if snapshot.generation != generation {
                    return false;
                }
                match settled {
                    Some(state) => snapshot.state = state.clone(),
                    None => snapshot.abandoned = true,
                }
                true
            });
        });
        self.current = Some((key, proxy.clone()));
        proxy
    }
}
