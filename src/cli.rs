use clap::Parser;

#[derive(Parser)]
#[command(name = "github-feed")]
#[command(about = "An endless feed of random public GitHub repositories in your terminal")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// GitHub access token; without one, requests run unauthenticated with
    /// the lower public rate limit
    #[arg(long, env = "GITHUB_TOKEN")]
    pub token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// Repositories requested per batch (5-10)
    #[arg(long, env = "FEED_BATCH_SIZE", default_value_t = 5)]
    pub batch_size: u32,

    /// Upper bound for the random listing offset
    #[arg(long, env = "FEED_MAX_OFFSET", default_value_t = 100_000)]
    pub max_offset: u64,

    /// Fetch full metadata (stars, forks, license, ...) for every repository
    #[arg(long, env = "FEED_ENRICH")]
    pub enrich: bool,

    /// Scroll ratio at which the next batch is requested
    #[arg(long, env = "FEED_PROXIMITY_THRESHOLD", default_value_t = 0.9)]
    pub proximity_threshold: f64,

    /// Quiet window applied to scroll signals, in milliseconds
    #[arg(long, env = "FEED_DEBOUNCE_MS", default_value_t = 500)]
    pub debounce_ms: u64,

    /// Delay applied before every listing request, in milliseconds
    #[arg(long, env = "FEED_REQUEST_DELAY_MS", default_value_t = 1000)]
    pub request_delay_ms: u64,
}
