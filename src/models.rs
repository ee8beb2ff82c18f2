use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::types::RawRepo;

/// Shown in place of a missing owner avatar.
pub const FALLBACK_AVATAR_URL: &str =
    "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";

/// One repository listing, normalized for display. Every optional upstream
/// field has been substituted with a defined default, so the presentation
/// layer never deals with missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub html_url: String,
    pub owner: RepoOwner,
    pub language: String,
    pub visibility: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub watchers_count: u64,
    pub open_issues_count: u64,
    pub homepage: String,
    pub topics: Vec<String>,
    pub license: Option<License>,
    pub size_kb: u64,
    pub default_branch: String,
    pub has_wiki: bool,
    pub has_pages: bool,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    pub spdx_id: String,
}

impl Repository {
    /// Maps a raw API record into a displayable repository. Counts and
    /// flags are only present in detail responses; summary records keep
    /// their defaults.
    pub fn from_raw(raw: RawRepo) -> Self {
        let owner = match raw.owner {
            Some(o) => RepoOwner {
                login: o.login.unwrap_or_else(|| "unknown".to_string()),
                avatar_url: o
                    .avatar_url
                    .unwrap_or_else(|| FALLBACK_AVATAR_URL.to_string()),
            },
            None => RepoOwner {
                login: "unknown".to_string(),
                avatar_url: FALLBACK_AVATAR_URL.to_string(),
            },
        };

        Repository {
            id: raw.id,
            name: raw.name,
            description: raw.description.unwrap_or_default(),
            html_url: raw.html_url,
            owner,
            language: raw.language.unwrap_or_default(),
            visibility: raw.visibility.unwrap_or_else(|| "public".to_string()),
            stargazers_count: raw.stargazers_count.unwrap_or(0),
            forks_count: raw.forks_count.unwrap_or(0),
            watchers_count: raw.watchers_count.unwrap_or(0),
            open_issues_count: raw.open_issues_count.unwrap_or(0),
            homepage: raw.homepage.unwrap_or_default(),
            topics: raw.topics.unwrap_or_default(),
            license: raw.license.map(|l| License {
                name: l.name.unwrap_or_default(),
                spdx_id: l.spdx_id.unwrap_or_default(),
            }),
            size_kb: raw.size.unwrap_or(0),
            default_branch: raw.default_branch.unwrap_or_else(|| "main".to_string()),
            has_wiki: raw.has_wiki.unwrap_or(false),
            has_pages: raw.has_pages.unwrap_or(false),
            archived: raw.archived.unwrap_or(false),
        }
    }
}

/// Rate limit state parsed from the last API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: DateTime<Utc>,
    pub is_limited: bool,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remaining: 5000,
            limit: 5000,
            reset_time: Utc::now() + chrono::Duration::hours(1),
            is_limited: false,
        }
    }
}

impl RateLimitState {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let remaining = headers
            .get("X-RateLimit-Remaining")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(5000);

        let limit = headers
            .get("X-RateLimit-Limit")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(5000);

        let reset_time = headers
            .get("X-RateLimit-Reset")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0))
            .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));

        RateLimitState {
            remaining,
            limit,
            reset_time,
            is_limited: remaining == 0,
        }
    }

    /// Whole minutes until the quota resets, rounded up and never negative.
    pub fn retry_after_minutes(&self) -> i64 {
        let secs = (self.reset_time - Utc::now()).num_seconds().max(0);
        (secs + 59) / 60
    }
}
