use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubFeedError {
    #[error("Rate limit exceeded. Please wait {retry_after_minutes} minutes before trying again.")]
    RateLimited { retry_after_minutes: i64 },

    #[error("GitHub API request failed with status {status}")]
    Upstream { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No repositories found. Please try again later.")]
    EmptyFeed,

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, GitHubFeedError>;
