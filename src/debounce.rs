use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Scroll position reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollGeometry {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

/// Coalesces bursts of scroll signals into a single evaluation: each signal
/// restarts the quiet window, and only the latest geometry is emitted once
/// the window passes with no new signal.
///
/// Dropping the debouncer closes the input side and ends the task without
/// emitting a pending signal, so nothing reaches the controller after the
/// view goes away.
pub struct ScrollDebouncer {
    tx: mpsc::UnboundedSender<ScrollGeometry>,
}

impl ScrollDebouncer {
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<ScrollGeometry>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ScrollGeometry>();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(geometry) => latest = geometry,
                            None => return,
                        },
                        _ = sleep(window) => {
                            if out_tx.send(latest).is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (ScrollDebouncer { tx }, out_rx)
    }

    /// Record a scroll signal; restarts the quiet window.
    pub fn signal(&self, geometry: ScrollGeometry) {
        let _ = self.tx.send(geometry);
    }
}
