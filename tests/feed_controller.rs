mod common;

use common::{batch, GatedSource, ScriptedSource};
use github_feed::error::GitHubFeedError;
use github_feed::feed::{FeedController, FeedErrorKind};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

const THRESHOLD: f64 = 0.9;

#[tokio::test]
async fn initial_load_populates_feed() {
    let source = ScriptedSource::new(vec![Ok(batch(1..6))]);
    let controller = FeedController::new(source, THRESHOLD);

    // A fresh feed reports loading until the first fetch completes.
    assert!(controller.is_loading());
    assert!(controller.items().is_empty());

    controller.initialize().await;

    let state = controller.state();
    assert_eq!(state.items.len(), 5);
    assert!(!state.is_loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn sequential_loads_append_in_order() {
    let source = ScriptedSource::new(vec![Ok(batch(1..4)), Ok(batch(10..13))]);
    let controller = FeedController::new(source, THRESHOLD);

    controller.initialize().await;
    controller.load_more().await;

    let ids: Vec<u64> = controller.items().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 10, 11, 12]);
}

#[tokio::test]
async fn concurrent_load_is_dropped_not_queued() {
    let source = Arc::new(GatedSource::new(batch(1..6)));
    let controller = Arc::new(FeedController::new(source.clone(), THRESHOLD));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.initialize().await })
    };

    // Wait until the first fetch is suspended inside the source.
    while source.call_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(controller.is_loading());

    // Issued while a fetch is in flight: must not reach the source or
    // change any state.
    controller.load_more().await;
    assert_eq!(source.call_count(), 1);
    assert!(controller.items().is_empty());
    assert!(controller.is_loading());

    source.release_one();
    assert_ok!(first.await);

    assert_eq!(source.call_count(), 1);
    assert_eq!(controller.items().len(), 5);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn remix_replaces_items_wholesale() {
    let source = ScriptedSource::new(vec![Ok(batch(1..6)), Ok(batch(20..23))]);
    let controller = FeedController::new(source, THRESHOLD);

    controller.initialize().await;
    assert_eq!(controller.items().len(), 5);

    controller.remix().await;

    let ids: Vec<u64> = controller.items().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![20, 21, 22]);
    assert!(!controller.is_mixing());
}

#[tokio::test]
async fn empty_first_batch_is_an_error() {
    let source = ScriptedSource::new(vec![Ok(Vec::new())]);
    let controller = FeedController::new(source, THRESHOLD);

    controller.initialize().await;

    let state = controller.state();
    assert!(state.items.is_empty());
    let error = state.error.expect("expected an error");
    assert_eq!(error.kind, FeedErrorKind::Empty);
    assert!(!error.message.is_empty());
}

#[tokio::test]
async fn empty_later_batch_is_ignored() {
    let source = ScriptedSource::new(vec![Ok(batch(1..6)), Ok(Vec::new())]);
    let controller = FeedController::new(source, THRESHOLD);

    controller.initialize().await;
    controller.load_more().await;

    let state = controller.state();
    assert_eq!(state.items.len(), 5);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn failed_fetch_keeps_existing_items() {
    let source = ScriptedSource::new(vec![
        Ok(batch(1..6)),
        Err(GitHubFeedError::Upstream { status: 500 }),
    ]);
    let controller = FeedController::new(source, THRESHOLD);

    controller.initialize().await;
    controller.load_more().await;

    let state = controller.state();
    assert_eq!(state.items.len(), 5);
    let error = state.error.expect("expected an error");
    assert_eq!(error.kind, FeedErrorKind::Upstream);
}

#[tokio::test]
async fn rate_limit_error_surfaces_wait_guidance() {
    let source = ScriptedSource::new(vec![Err(GitHubFeedError::RateLimited {
        retry_after_minutes: 12,
    })]);
    let controller = FeedController::new(source, THRESHOLD);

    controller.initialize().await;

    let error = controller.error().expect("expected an error");
    assert_eq!(error.kind, FeedErrorKind::RateLimited);
    assert!(error.message.contains("12 minutes"));
}

#[tokio::test]
async fn successful_fetch_clears_previous_error() {
    let source = ScriptedSource::new(vec![
        Ok(batch(1..6)),
        Err(GitHubFeedError::Upstream { status: 502 }),
        Ok(batch(6..9)),
    ]);
    let controller = FeedController::new(source, THRESHOLD);

    controller.initialize().await;
    controller.load_more().await;
    assert!(controller.error().is_some());

    controller.load_more().await;

    let state = controller.state();
    assert!(state.error.is_none());
    assert_eq!(state.items.len(), 8);
}

#[tokio::test]
async fn retry_clears_error_and_fetches_again() {
    let source = Arc::new(ScriptedSource::new(vec![
        Err(GitHubFeedError::Upstream { status: 502 }),
        Ok(batch(1..6)),
    ]));
    let controller = FeedController::new(source.clone(), THRESHOLD);

    controller.initialize().await;
    assert!(controller.error().is_some());
    assert!(controller.items().is_empty());

    controller.retry().await;

    let state = controller.state();
    assert_eq!(state.items.len(), 5);
    assert!(state.error.is_none());
    assert_eq!(source.call_count(), 2);
}

#[tokio::test]
async fn proximity_past_threshold_triggers_one_load() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(batch(1..6)), Ok(batch(6..11))]));
    let controller = FeedController::new(source.clone(), THRESHOLD);
    controller.initialize().await;

    // (8.5 + 1.0) / 10.0 = 0.95
    controller.on_scroll_proximity(8.5, 1.0, 10.0).await;

    assert_eq!(source.call_count(), 2);
    assert_eq!(controller.items().len(), 10);
}

#[tokio::test]
async fn proximity_below_threshold_does_nothing() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(batch(1..6)), Ok(batch(6..11))]));
    let controller = FeedController::new(source.clone(), THRESHOLD);
    controller.initialize().await;

    // (2.0 + 1.0) / 10.0 = 0.3
    controller.on_scroll_proximity(2.0, 1.0, 10.0).await;

    assert_eq!(source.call_count(), 1);
    assert_eq!(controller.items().len(), 5);
}

#[tokio::test]
async fn proximity_with_active_error_does_nothing() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(batch(1..6)),
        Err(GitHubFeedError::Upstream { status: 500 }),
        Ok(batch(6..11)),
    ]));
    let controller = FeedController::new(source.clone(), THRESHOLD);
    controller.initialize().await;
    controller.load_more().await;
    assert!(controller.error().is_some());

    controller.on_scroll_proximity(9.0, 1.0, 10.0).await;

    assert_eq!(source.call_count(), 2);
    assert_eq!(controller.items().len(), 5);
}

#[tokio::test]
async fn proximity_with_no_content_is_ignored() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(batch(1..6))]));
    let controller = FeedController::new(source.clone(), THRESHOLD);

    controller.on_scroll_proximity(0.0, 1.0, 0.0).await;

    assert_eq!(source.call_count(), 0);
}
