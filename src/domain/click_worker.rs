//! Background worker persisting queued click events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::ClickRepository;

const MAX_RETRIES: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// At most `concurrency` inserts run at the same time. Each insert is retried with
/// jittered exponential backoff; a click that still fails is logged and dropped.
/// Before returning, the worker waits for in-flight inserts to finish.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn ClickRepository>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tokio::spawn(async move {
            persist_click(repository.as_ref(), event).await;
            drop(permit);
        });
    }

    // All permits free means every spawned insert has completed.
    let _ = permits.acquire_many(concurrency as u32).await;
    info!("Click worker stopped");
}

async fn persist_click(repository: &dyn ClickRepository, event: ClickEvent) {
    let code = event.code.clone();
    let new_click = NewClick::from(event);

    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    let result = Retry::spawn(strategy, || {
        let new_click = new_click.clone();
        async move { repository.record_click(new_click).await }
    })
    .await;

    match result {
        Ok(click) => debug!("Recorded click {} for {}", click.id, code),
        Err(e) => {
            metrics::counter!("clicks_failed_total").increment(1);
            error!("Failed to record click for {} after retries: {}", code, e);
        }
    }
}
