//! Single-owner apply queue for one share.
//!
//! Producers on any task enqueue batches; one worker task applies them to
//! the cache in arrival order, so a share never sees two batches applied
//! concurrently.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use drivelinks_cache::LinksCache;
use drivelinks_core::config::events::EventsConfig;
use drivelinks_core::error::AppError;
use drivelinks_core::result::AppResult;
use drivelinks_core::types::ShareId;
use drivelinks_entity::EventBatch;

/// Bounded queue with a dedicated worker applying batches to the cache.
#[derive(Debug)]
pub struct ShareEventQueue {
    /// Share the queue feeds.
    share_id: ShareId,
    /// Sender half; dropping it stops the worker.
    sender: mpsc::Sender<EventBatch>,
    /// Worker task, yields the number of batches applied.
    worker: JoinHandle<u64>,
}

impl ShareEventQueue {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(cache: LinksCache, share_id: ShareId, config: &EventsConfig) -> Self {
        let (sender, mut receiver) = mpsc::channel::<EventBatch>(config.queue_capacity.max(1));
        let worker_share = share_id.clone();
        let worker = tokio::spawn(async move {
            let mut applied = 0u64;
            while let Some(batch) = receiver.recv().await {
                if cache.apply_batch(&worker_share, &batch) {
                    applied += 1;
                } else {
                    warn!(share_id = %worker_share, events = batch.len(), "Share not cached, batch dropped");
                }
            }
            debug!(share_id = %worker_share, applied, "Event queue drained");
            applied
        });
        info!(share_id = %share_id, capacity = config.queue_capacity, "Started event queue");
        Self {
            share_id,
            sender,
            worker,
        }
    }

    /// The share the queue feeds.
    pub fn share_id(&self) -> &ShareId {
        &self.share_id
    }

    /// Enqueue a batch, waiting while the queue is full.
    pub async fn enqueue(&self, batch: EventBatch) -> AppResult<()> {
        self.sender.send(batch).await.map_err(|_| self.closed())
    }

    /// Enqueue a batch without waiting.
    pub fn try_enqueue(&self, batch: EventBatch) -> AppResult<()> {
        self.sender.try_send(batch).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => AppError::event_source(format!(
                "Event queue for share {} is full",
                self.share_id
            )),
            mpsc::error::TrySendError::Closed(_) => self.closed(),
        })
    }

    /// Close the queue, wait for queued batches to be applied, and return
    /// how many were applied.
    pub async fn shutdown(self) -> AppResult<u64> {
        let Self {
            share_id,
            sender,
            worker,
        } = self;
        drop(sender);
        worker.await.map_err(|e| {
            AppError::with_source(
                drivelinks_core::error::ErrorKind::Internal,
                format!("Event queue worker for share {share_id} failed"),
                e,
            )
        })
    }

    fn closed(&self) -> AppError {
        AppError::event_source(format!("Event queue for share {} is closed", self.share_id))
    }
}
