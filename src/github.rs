use crate::error::{GitHubFeedError, Result};
use crate::feed::RepoSource;
use crate::models::{RateLimitState, Repository};
use crate::types::RawRepo;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::{Client, Response};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

const DEFAULT_API_URL: &str = "https://api.github.com";
const MIN_BATCH_SIZE: u32 = 5;
const MAX_BATCH_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    pub api_url: String,
    /// Optional access token; absence means unauthenticated requests with
    /// the lower public rate limit.
    pub token: Option<String>,
    pub batch_size: u32,
    /// Upper bound for the random listing offset.
    pub max_offset: u64,
    /// Voluntary throttle applied before every listing request.
    pub request_delay: Duration,
    /// Fetch full metadata for each repository in a batch.
    pub enrich: bool,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            batch_size: MIN_BATCH_SIZE,
            max_offset: 100_000,
            request_delay: Duration::from_secs(1),
            enrich: false,
        }
    }
}

pub struct GitHubClient {
    client: Client,
    base: Url,
    config: GitHubClientConfig,
    rate_limit: Mutex<RateLimitState>,
}

impl GitHubClient {
    pub fn new(mut config: GitHubClientConfig) -> Result<Self> {
        let base = Url::parse(&config.api_url)?;

        if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&config.batch_size) {
            warn!(
                batch_size = config.batch_size,
                "batch size out of range, clamping to {}-{}", MIN_BATCH_SIZE, MAX_BATCH_SIZE
            );
            config.batch_size = config.batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);
        }

        let client = Client::builder()
            .user_agent("github-feed/0.1.0")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            client,
            base,
            config,
            rate_limit: Mutex::new(RateLimitState::default()),
        })
    }

    /// Rate limit state observed on the most recent response.
    pub fn rate_limit_state(&self) -> RateLimitState {
        self.rate_limit.lock().expect("rate limit lock poisoned").clone()
    }

    fn store_rate_limit(&self, state: &RateLimitState) {
        *self.rate_limit.lock().expect("rate limit lock poisoned") = state.clone();
    }

    async fn request(&self, url: Url) -> Result<Response> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");

        if let Some(token) = &self.config.token {
            request = request.header("Authorization", format!("token {}", token));
        }

        Ok(request.send().await?)
    }

    /// Fetch one batch of repositories from a random offset into the
    /// public listing.
    pub async fn fetch_batch(&self) -> Result<Vec<Repository>> {
        // A quota exhausted by an earlier response fails the call before
        // any HTTP work.
        {
            let rl = self.rate_limit.lock().expect("rate limit lock poisoned");
            if rl.is_limited && Utc::now() < rl.reset_time {
                return Err(GitHubFeedError::RateLimited {
                    retry_after_minutes: rl.retry_after_minutes(),
                });
            }
        }

        sleep(self.config.request_delay).await;

        let offset = rand::thread_rng().gen_range(0..self.config.max_offset.max(1));
        let mut url = self.base.join("repositories")?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.config.batch_size.to_string())
            .append_pair("since", &offset.to_string());

        debug!(offset, per_page = self.config.batch_size, "fetching repository batch");

        let response = self.request(url).await?;

        let rate_limit = RateLimitState::from_headers(response.headers());
        self.store_rate_limit(&rate_limit);
        if rate_limit.is_limited {
            warn!(reset_time = %rate_limit.reset_time, "rate limit exhausted");
            return Err(GitHubFeedError::RateLimited {
                retry_after_minutes: rate_limit.retry_after_minutes(),
            });
        }

        let status = response.status();
        if !status.is_success() {
            return Err(GitHubFeedError::Upstream {
                status: status.as_u16(),
            });
        }

        let raw: Vec<RawRepo> = response.json().await?;
        debug!(count = raw.len(), "received repository batch");

        if self.config.enrich {
            let enriched = raw.into_iter().map(|r| self.enrich_repo(r));
            Ok(futures::future::join_all(enriched).await)
        } else {
            Ok(raw.into_iter().map(Repository::from_raw).collect())
        }
    }

    /// Best-effort: a failed detail request falls back to the summary
    /// record rather than failing the batch.
    async fn enrich_repo(&self, raw: RawRepo) -> Repository {
        match self.fetch_detail(raw.id).await {
            Ok(detail) => Repository::from_raw(detail),
            Err(e) => {
                debug!(repo_id = raw.id, error = %e, "detail request failed, keeping summary data");
                Repository::from_raw(raw)
            }
        }
    }

    async fn fetch_detail(&self, id: u64) -> Result<RawRepo> {
        let url = self.base.join(&format!("repositories/{}", id))?;
        let response = self.request(url).await?;

        let rate_limit = RateLimitState::from_headers(response.headers());
        self.store_rate_limit(&rate_limit);
        if rate_limit.is_limited {
            return Err(GitHubFeedError::RateLimited {
                retry_after_minutes: rate_limit.retry_after_minutes(),
            });
        }

        let status = response.status();
        if !status.is_success() {
            return Err(GitHubFeedError::Upstream {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn fetch_batch(&self) -> Result<Vec<Repository>> {
        GitHubClient::fetch_batch(self).await
    }
}
