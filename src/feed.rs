use crate::error::{GitHubFeedError, Result};
use crate::models::Repository;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Where batches come from. The feed controller only ever talks to this
/// trait, so tests can substitute a scripted source for the live client.
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn fetch_batch(&self) -> Result<Vec<Repository>>;
}

#[async_trait]
impl<S: RepoSource + ?Sized> RepoSource for Arc<S> {
    async fn fetch_batch(&self) -> Result<Vec<Repository>> {
        (**self).fetch_batch().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedErrorKind {
    RateLimited,
    Upstream,
    Network,
    Empty,
}

/// What the presentation layer gets instead of a raw error: a kind to
/// branch on and a message fit to show the user.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedError {
    pub kind: FeedErrorKind,
    pub message: String,
}

impl From<&GitHubFeedError> for FeedError {
    fn from(e: &GitHubFeedError) -> Self {
        match e {
            GitHubFeedError::RateLimited { .. } => FeedError {
                kind: FeedErrorKind::RateLimited,
                message: e.to_string(),
            },
            GitHubFeedError::Network(_) => FeedError {
                kind: FeedErrorKind::Network,
                message: "Connection problem. Please check your network and try again."
                    .to_string(),
            },
            GitHubFeedError::EmptyFeed => FeedError {
                kind: FeedErrorKind::Empty,
                message: e.to_string(),
            },
            GitHubFeedError::Upstream { .. } | GitHubFeedError::InvalidBaseUrl(_) => FeedError {
                kind: FeedErrorKind::Upstream,
                message: "Failed to load repositories. Please try again later.".to_string(),
            },
        }
    }
}

/// Snapshot of the feed for the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub items: Vec<Repository>,
    pub is_loading: bool,
    pub is_mixing: bool,
    pub error: Option<FeedError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    Append,
    Replace,
}

struct Inner {
    items: Vec<Repository>,
    error: Option<FeedError>,
}

/// Owns the ordered repository list shown to the user and every rule about
/// when to grow it: at most one fetch in flight, proximity-triggered loads,
/// full reset, and error surfacing.
///
/// Items and error live under a mutex that is never held across an await;
/// the in-flight guard is a compare-and-set on an atomic, so a `load_more`
/// arriving while a fetch is suspended is dropped, not queued.
pub struct FeedController<S> {
    source: S,
    proximity_threshold: f64,
    inner: Mutex<Inner>,
    in_flight: AtomicBool,
    is_loading: AtomicBool,
    is_mixing: AtomicBool,
}

impl<S: RepoSource> FeedController<S> {
    /// A fresh feed reports loading until the initial fetch completes.
    pub fn new(source: S, proximity_threshold: f64) -> Self {
        FeedController {
            source,
            proximity_threshold,
            inner: Mutex::new(Inner {
                items: Vec::new(),
                error: None,
            }),
            in_flight: AtomicBool::new(false),
            is_loading: AtomicBool::new(true),
            is_mixing: AtomicBool::new(false),
        }
    }

    /// First fetch. On an empty feed an append is a replace, so this shares
    /// the `load_more` path; an empty first batch surfaces an error instead
    /// of being ignored.
    pub async fn initialize(&self) {
        self.load(LoadMode::Append).await;
    }

    /// Fetch one more batch and append it. Returns immediately if a fetch
    /// is already in flight.
    pub async fn load_more(&self) {
        self.load(LoadMode::Append).await;
    }

    /// Full reset: a successful batch replaces the feed wholesale. The
    /// presentation layer is expected to move its viewport back to the
    /// start when it issues one of these.
    pub async fn remix(&self) {
        self.load(LoadMode::Replace).await;
    }

    /// Evaluate a (debounced) scroll signal and load more when the view is
    /// close enough to the end of the content.
    pub async fn on_scroll_proximity(
        &self,
        scroll_offset: f64,
        viewport_height: f64,
        content_height: f64,
    ) {
        if content_height <= 0.0 {
            return;
        }
        if self.in_flight.load(Ordering::Acquire) || self.error().is_some() {
            return;
        }

        let ratio = (scroll_offset + viewport_height) / content_height;
        if ratio >= self.proximity_threshold {
            debug!(ratio, "scroll proximity reached, loading more");
            self.load_more().await;
        }
    }

    /// Clear the current error and fetch again.
    pub async fn retry(&self) {
        self.lock_inner().error = None;
        self.load_more().await;
    }

    async fn load(&self, mode: LoadMode) {
        // Indivisible check-and-set; losers are dropped, not queued.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("fetch already in flight, skipping");
            return;
        }
        self.is_loading.store(true, Ordering::Release);
        if mode == LoadMode::Replace {
            self.is_mixing.store(true, Ordering::Release);
        }

        let result = self.source.fetch_batch().await;

        {
            let mut inner = self.lock_inner();
            match result {
                Ok(batch) if !batch.is_empty() => {
                    info!(count = batch.len(), ?mode, "applying fetched batch");
                    match mode {
                        LoadMode::Replace => inner.items = batch,
                        LoadMode::Append => inner.items.extend(batch),
                    }
                    inner.error = None;
                }
                Ok(_) => {
                    if inner.items.is_empty() {
                        inner.error = Some(FeedError::from(&GitHubFeedError::EmptyFeed));
                    } else {
                        // No more for now; keep what we have.
                        debug!("empty batch on a non-empty feed, ignoring");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "fetch failed");
                    inner.error = Some(FeedError::from(&e));
                }
            }
        }

        self.is_loading.store(false, Ordering::Release);
        self.is_mixing.store(false, Ordering::Release);
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn state(&self) -> FeedState {
        let inner = self.lock_inner();
        FeedState {
            items: inner.items.clone(),
            is_loading: self.is_loading.load(Ordering::Acquire),
            is_mixing: self.is_mixing.load(Ordering::Acquire),
            error: inner.error.clone(),
        }
    }

    pub fn items(&self) -> Vec<Repository> {
        self.lock_inner().items.clone()
    }

    pub fn error(&self) -> Option<FeedError> {
        self.lock_inner().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::Acquire)
    }

    pub fn is_mixing(&self) -> bool {
        self.is_mixing.load(Ordering::Acquire)
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("feed state lock poisoned")
    }
}
