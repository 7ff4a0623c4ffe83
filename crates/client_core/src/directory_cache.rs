//! Lazily-fetched, revalidatable copy of the customer collection.
//!
//! State is published through a [`watch`] channel so views can re-render on
//! every transition. Reads are de-duplicated: while one fetch is in flight,
//! every `load()`/`invalidate()` caller awaits that same request.

use std::sync::Arc;

use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use shared::{domain::Customer, error::ApiError};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::{error::LIST_FAILED_MESSAGE, transport::DirectoryApi};

/// Immutable snapshot of the collection. Replaced wholesale on every fetch.
pub type CustomerCollection = Arc<[Customer]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState<T> {
    Loading,
    Error(ApiError),
    Ready(T),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

type InflightFetch = Shared<BoxFuture<'static, FetchState<CustomerCollection>>>;

enum Claim {
    Join(InflightFetch),
    Cached(FetchState<CustomerCollection>),
}

struct CacheInner {
    api: Arc<dyn DirectoryApi>,
    state: watch::Sender<FetchState<CustomerCollection>>,
    inflight: Mutex<Option<InflightFetch>>,
}

#[derive(Clone)]
pub struct DirectoryCache {
    inner: Arc<CacheInner>,
}

impl DirectoryCache {
    pub fn new(api: Arc<dyn DirectoryApi>) -> Self {
        let (state, _) = watch::channel(FetchState::Loading);
        Self {
            inner: Arc::new(CacheInner {
                api,
                state,
                inflight: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> FetchState<CustomerCollection> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<CustomerCollection>> {
        self.inner.state.subscribe()
    }

    /// Returns the cached collection when ready, otherwise fetches it. Joins
    /// the in-flight fetch instead of issuing a second request.
    pub async fn load(&self) -> FetchState<CustomerCollection> {
        match self.claim(false).await {
            Claim::Join(fetch) => fetch.await,
            Claim::Cached(ready) => ready,
        }
    }

    /// Discards the cached collection and refetches it.
    pub async fn invalidate(&self) -> FetchState<CustomerCollection> {
        debug!("customer collection invalidated");
        match self.claim(true).await {
            Claim::Join(fetch) => fetch.await,
            Claim::Cached(ready) => ready,
        }
    }

    /// Picks the fetch to await. Slot inspection, the `Loading` transition
    /// and slot installation all happen under the slot lock; the fetch
    /// publishes and clears the slot under the same lock, so a caller either
    /// joins a fetch that has yet to publish or starts a new one.
    async fn claim(&self, force: bool) -> Claim {
        let mut slot = self.inner.inflight.lock().await;
        if let Some(fetch) = slot.as_ref() {
            debug!("joining in-flight customer fetch");
            return Claim::Join(fetch.clone());
        }
        if !force {
            if let ready @ FetchState::Ready(_) = self.state() {
                return Claim::Cached(ready);
            }
        }
        mark_loading(&self.inner.state);
        let fetch = self.start_fetch();
        *slot = Some(fetch.clone());
        Claim::Join(fetch)
    }

    fn start_fetch(&self) -> InflightFetch {
        let inner = Arc::clone(&self.inner);
        async move {
            let next = match inner.api.list_customers().await {
                Ok(customers) => {
                    info!(count = customers.len(), "customer collection loaded");
                    FetchState::Ready(CustomerCollection::from(customers))
                }
                Err(err) => {
                    warn!(%err, "failed to load customer collection");
                    FetchState::Error(err.to_api_error(LIST_FAILED_MESSAGE))
                }
            };
            let mut slot = inner.inflight.lock().await;
            inner.state.send_replace(next.clone());
            slot.take();
            next
        }
        .boxed()
        .shared()
    }
}

fn mark_loading(state: &watch::Sender<FetchState<CustomerCollection>>) {
    state.send_if_modified(|current| {
        if current.is_loading() {
            false
        } else {
            *current = FetchState::Loading;
            true
        }
    });
}

#[cfg(test)]
#[path = "tests/directory_cache_tests.rs"]
mod tests;
