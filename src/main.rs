use anyhow::Context;
use clap::Parser;
use colored::*;
use github_feed::cli::Cli;
use github_feed::debounce::{ScrollDebouncer, ScrollGeometry};
use github_feed::feed::FeedController;
use github_feed::github::{GitHubClient, GitHubClientConfig};
use github_feed::models::Repository;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// Every card fills the viewport, so scroll positions are measured in cards.
const CARD_HEIGHT: f64 = 1.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    println!("{}", "GitHub Repository Feed".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());

    if cli.token.is_none() {
        println!(
            "{}",
            "No GITHUB_TOKEN set; running unauthenticated with lower rate limits".yellow()
        );
    }

    let config = GitHubClientConfig {
        api_url: cli.api_url.clone(),
        token: cli.token.clone(),
        batch_size: cli.batch_size,
        max_offset: cli.max_offset,
        request_delay: Duration::from_millis(cli.request_delay_ms),
        enrich: cli.enrich,
    };

    let client =
        Arc::new(GitHubClient::new(config).context("failed to create GitHub client")?);
    let controller = Arc::new(FeedController::new(
        client.clone(),
        cli.proximity_threshold,
    ));

    println!("Loading repositories...");
    controller.initialize().await;

    let (debouncer, mut proximity_rx) =
        ScrollDebouncer::new(Duration::from_millis(cli.debounce_ms));

    let mut index = 0usize;
    render(&controller, index);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                match line.trim() {
                    "q" => break,
                    "p" => {
                        index = index.saturating_sub(1);
                    }
                    "r" => {
                        println!("{}", "Retrying...".yellow());
                        controller.retry().await;
                    }
                    "m" => {
                        println!("{}", "Remixing the feed...".yellow());
                        // A remix starts over, so the viewport goes back to
                        // the first card.
                        index = 0;
                        controller.remix().await;
                    }
                    _ => {
                        let total = controller.items().len();
                        if total > 0 && index + 1 < total {
                            index += 1;
                        }
                        debouncer.signal(ScrollGeometry {
                            scroll_offset: index as f64 * CARD_HEIGHT,
                            viewport_height: CARD_HEIGHT,
                            content_height: total as f64 * CARD_HEIGHT,
                        });
                    }
                }
                render(&controller, index);
            }
            Some(geometry) = proximity_rx.recv() => {
                let controller = controller.clone();
                tokio::spawn(async move {
                    controller
                        .on_scroll_proximity(
                            geometry.scroll_offset,
                            geometry.viewport_height,
                            geometry.content_height,
                        )
                        .await;
                });
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    let rate_limit = client.rate_limit_state();
    println!("\n{}", "Session summary".bold());
    println!("Repositories loaded: {}", controller.items().len());
    println!(
        "Rate limit remaining: {}/{}",
        rate_limit.remaining, rate_limit.limit
    );
    if rate_limit.is_limited {
        println!(
            "Rate limit resets in {} minutes",
            rate_limit.retry_after_minutes()
        );
    }
    println!("{}", "Goodbye!".green());

    Ok(())
}

fn render(controller: &FeedController<Arc<GitHubClient>>, index: usize) {
    let state = controller.state();

    if state.items.is_empty() {
        if let Some(error) = &state.error {
            // Full-screen error view: nothing to show, so the error takes over.
            println!("\n{}", "Something went wrong".bold().red());
            println!("{}", error.message);
            println!("{}", "Press r to retry, q to quit".dimmed());
        } else if state.is_loading {
            println!("{}", "Loading repositories...".dimmed());
        }
        return;
    }

    let index = index.min(state.items.len() - 1);
    print_card(&state.items[index], index, state.items.len());

    if state.is_mixing {
        println!("{}", "Remixing...".dimmed());
    } else if state.is_loading {
        println!("{}", "Loading more...".dimmed());
    }

    // Inline notice: the feed already has content, so it stays browsable.
    if let Some(error) = &state.error {
        println!("{}", error.message.yellow());
    }

    println!(
        "{}",
        "[enter] next  [p] prev  [m] remix  [r] retry  [q] quit".dimmed()
    );
}

fn print_card(repo: &Repository, position: usize, total: usize) {
    println!("\n{}", "-".repeat(50).dimmed());
    println!(
        "{} {}",
        repo.name.bold().green(),
        format!("({}/{})", position + 1, total).dimmed()
    );
    println!("{} {}", "by".dimmed(), repo.owner.login.cyan());
    if !repo.description.is_empty() {
        println!("{}", repo.description);
    }
    if !repo.language.is_empty() {
        println!("{} {}", "Language:".dimmed(), repo.language.yellow());
    }
    if repo.stargazers_count > 0 || repo.forks_count > 0 || repo.open_issues_count > 0 {
        println!(
            "{} {}  {} {}  {} {}",
            "Stars:".dimmed(),
            repo.stargazers_count,
            "Forks:".dimmed(),
            repo.forks_count,
            "Issues:".dimmed(),
            repo.open_issues_count
        );
    }
    if let Some(license) = &repo.license {
        println!("{} {}", "License:".dimmed(), license.name);
    }
    if !repo.topics.is_empty() {
        println!("{} {}", "Topics:".dimmed(), repo.topics.join(", "));
    }
    if repo.archived {
        println!("{}", "Archived".yellow());
    }
    println!("{}", repo.html_url.blue().underline());
}
