//! Fire-and-forget click tracking.

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::domain::click_event::ClickEvent;

/// Producer side of the click queue.
///
/// [`ClickTracker::track`] never waits: when the queue is full or the worker
/// has stopped, the click is dropped and counted in `clicks_dropped_total`.
/// Redirect latency never depends on click persistence.
#[derive(Clone)]
pub struct ClickTracker {
    sender: mpsc::Sender<ClickEvent>,
}

impl ClickTracker {
    pub fn new(sender: mpsc::Sender<ClickEvent>) -> Self {
        Self { sender }
    }

    /// Queues a click for the background worker.
    pub fn track(&self, event: ClickEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!("Click queue full, dropping click for {}", event.code);
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                error!("Click worker stopped, dropping click for {}", event.code);
            }
        }
    }

    /// Returns true once the worker side of the queue is gone.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}
