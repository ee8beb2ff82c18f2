use async_trait::async_trait;
use github_feed::error::Result;
use github_feed::feed::RepoSource;
use github_feed::models::{RepoOwner, Repository, FALLBACK_AVATAR_URL};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

pub fn repo(id: u64, name: &str) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        description: String::new(),
        html_url: format!("https://github.com/octocat/{}", name),
        owner: RepoOwner {
            login: "octocat".to_string(),
            avatar_url: FALLBACK_AVATAR_URL.to_string(),
        },
        language: String::new(),
        visibility: "public".to_string(),
        stargazers_count: 0,
        forks_count: 0,
        watchers_count: 0,
        open_issues_count: 0,
        homepage: String::new(),
        topics: Vec::new(),
        license: None,
        size_kb: 0,
        default_branch: "main".to_string(),
        has_wiki: false,
        has_pages: false,
        archived: false,
    }
}

pub fn batch(ids: std::ops::Range<u64>) -> Vec<Repository> {
    ids.map(|id| repo(id, &format!("repo-{}", id))).collect()
}

/// Plays back a script of batches, one per call; an exhausted script keeps
/// returning empty batches.
pub struct ScriptedSource {
    batches: Mutex<VecDeque<Result<Vec<Repository>>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(batches: Vec<Result<Vec<Repository>>>) -> Self {
        ScriptedSource {
            batches: Mutex::new(batches.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepoSource for ScriptedSource {
    async fn fetch_batch(&self) -> Result<Vec<Repository>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Suspends every fetch until released, for exercising the in-flight guard.
pub struct GatedSource {
    release: Notify,
    batch: Vec<Repository>,
    calls: AtomicUsize,
}

impl GatedSource {
    pub fn new(batch: Vec<Repository>) -> Self {
        GatedSource {
            release: Notify::new(),
            batch,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release_one(&self) {
        self.release.notify_one();
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepoSource for GatedSource {
    async fn fetch_batch(&self) -> Result<Vec<Repository>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(self.batch.clone())
    }
}
